//! HTML rendering
//!
//! Pages are assembled with `format!` into one shared layout. Every value
//! that came from a user or the store goes through [`escape`].

use ctx_common::auth::{Flash, User};

use crate::validation::FormErrors;

pub mod associations;
pub mod auth;
pub mod errors;
pub mod home;
pub mod images;
pub mod maps;
pub mod occurrences;
pub mod topics;

/// Escape text for HTML element content and quoted attribute values
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            color: #222;
            background-color: #fafafa;
            line-height: 1.5;
        }
        header {
            background-color: #2a2a2a;
            color: #e0e0e0;
            padding: 12px 20px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }
        header a { color: #4a9eff; text-decoration: none; margin-left: 12px; }
        header form { display: inline; }
        header button { background: none; border: none; color: #4a9eff; cursor: pointer; font-size: inherit; }
        main { max-width: 960px; margin: 0 auto; padding: 20px; }
        .flash { padding: 10px 14px; border-radius: 4px; margin-bottom: 16px; }
        .flash-success { background: #e3f6e8; border: 1px solid #6cc08b; }
        .flash-warning { background: #fff6dd; border: 1px solid #e0b84c; }
        .flash-danger { background: #fde6e6; border: 1px solid #d46a6a; }
        label { display: block; font-weight: 600; margin-top: 12px; }
        input[type=text], input[type=email], input[type=password], input[type=url], textarea {
            width: 100%;
            padding: 6px 8px;
            border: 1px solid #bbb;
            border-radius: 4px;
        }
        .is-invalid { border-color: #d46a6a !important; }
        .invalid-feedback { color: #b03030; font-size: 0.9em; }
        .actions { margin-top: 16px; }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #ddd; }
        .muted { color: #777; }
"#;

/// Wrap `body` in the site layout
pub fn page(title: &str, user: Option<&User>, flash: Option<&Flash>, body: &str) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<span>{email}</span><a href="/maps">Maps</a><a href="/auth/change-password">Change password</a><form method="post" action="/auth/logout"><button type="submit">Log out</button></form>"#,
            email = escape(&user.email)
        ),
        None => r#"<a href="/auth/login">Log in</a><a href="/auth/register">Register</a>"#.to_string(),
    };

    let flash = flash
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{category}">{message}</div>"#,
                category = flash.category,
                message = escape(&flash.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Contextualise</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <a href="/"><strong>Contextualise</strong></a>
        <nav>{account}</nav>
    </header>
    <main>
        {flash}
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        account = account,
        flash = flash,
        body = body
    )
}

/// CSS class for an input whose rule bit failed
pub(crate) fn invalid_class(errors: FormErrors, bit: u32) -> &'static str {
    if errors.has(bit) {
        " is-invalid"
    } else {
        ""
    }
}

/// Inline message shown under an input whose rule bit failed
pub(crate) fn feedback(errors: FormErrors, bit: u32, message: &str) -> String {
    if errors.has(bit) {
        format!(r#"<div class="invalid-feedback">{}</div>"#, escape(message))
    } else {
        String::new()
    }
}

/// Single-line text input with label and error highlighting
pub(crate) fn text_input(
    name: &str,
    label: &str,
    value: &str,
    errors: FormErrors,
    rules: &[(u32, &str)],
) -> String {
    let class = rules
        .iter()
        .map(|(bit, _)| invalid_class(errors, *bit))
        .find(|class| !class.is_empty())
        .unwrap_or("");
    let messages: String = rules
        .iter()
        .map(|(bit, message)| feedback(errors, *bit, message))
        .collect();

    format!(
        r#"<label for="{name}">{label}</label>
        <input type="text" id="{name}" name="{name}" class="form-control{class}" value="{value}">
        {messages}"#,
        name = name,
        label = escape(label),
        class = class,
        value = escape(value),
        messages = messages
    )
}
