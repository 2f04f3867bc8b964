use ctx_common::auth::{Flash, User};

use super::page;

pub fn home_page(user: Option<&User>, flash: Option<&Flash>) -> String {
    let call_to_action = if user.is_some() {
        r#"<p><a href="/maps">Go to your topic maps</a></p>"#
    } else {
        r#"<p><a href="/auth/login">Log in</a> or <a href="/auth/register">create an account</a> to start building topic maps.</p>"#
    };

    let body = format!(
        r#"<h1>Contextualise</h1>
        <p>A tool for organising information and knowledge with topic maps: topics,
        the resources that describe them and the associations between them.</p>
        {}"#,
        call_to_action
    );

    page("Home", user, flash, &body)
}
