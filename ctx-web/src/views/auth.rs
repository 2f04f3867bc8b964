use ctx_common::auth::{Flash, User, MIN_PASSWORD_LENGTH};

use super::{escape, feedback, invalid_class, page};
use crate::validation::FormErrors;

pub const REGISTER_EMAIL_EMPTY: u32 = 1;
pub const REGISTER_PASSWORD_TOO_SHORT: u32 = 2;
pub const REGISTER_PASSWORDS_DIFFER: u32 = 4;
pub const REGISTER_EMAIL_EXISTS: u32 = 8;

pub const CHANGE_CURRENT_PASSWORD_WRONG: u32 = 1;
pub const CHANGE_PASSWORD_TOO_SHORT: u32 = 2;
pub const CHANGE_PASSWORDS_DIFFER: u32 = 4;

/// Login form; `failed` shows the bad-credentials message
pub fn login_page(email: &str, failed: bool, flash: Option<&Flash>, registerable: bool) -> String {
    let error = if failed {
        r#"<div class="flash flash-danger">Invalid email or password.</div>"#
    } else {
        ""
    };
    let register = if registerable {
        r#"<p class="muted">No account yet? <a href="/auth/register">Register</a>.</p>"#
    } else {
        ""
    };

    let body = format!(
        r#"<h1>Log in</h1>
        {error}
        <form method="post" action="/auth/login">
            <label for="email">Email</label>
            <input type="email" id="email" name="email" value="{email}" autofocus>
            <label for="password">Password</label>
            <input type="password" id="password" name="password">
            <div class="actions"><button type="submit">Log in</button></div>
        </form>
        {register}"#,
        error = error,
        email = escape(email),
        register = register
    );

    page("Log in", None, flash, &body)
}

pub fn register_page(email: &str, errors: FormErrors, flash: Option<&Flash>) -> String {
    let password_message = format!(
        "Password must be at least {} characters long.",
        MIN_PASSWORD_LENGTH
    );

    let body = format!(
        r#"<h1>Register</h1>
        <form method="post" action="/auth/register">
            <label for="email">Email</label>
            <input type="email" id="email" name="email" class="form-control{email_class}" value="{email}" autofocus>
            {email_empty}{email_exists}
            <label for="password">Password</label>
            <input type="password" id="password" name="password" class="form-control{password_class}">
            {password_short}
            <label for="password-confirm">Confirm password</label>
            <input type="password" id="password-confirm" name="password-confirm" class="form-control{confirm_class}">
            {passwords_differ}
            <div class="actions"><button type="submit">Register</button></div>
        </form>
        <p class="muted">Already registered? <a href="/auth/login">Log in</a>.</p>"#,
        email_class = invalid_class(errors, REGISTER_EMAIL_EMPTY | REGISTER_EMAIL_EXISTS),
        email = escape(email),
        email_empty = feedback(errors, REGISTER_EMAIL_EMPTY, "Email is required."),
        email_exists = feedback(
            errors,
            REGISTER_EMAIL_EXISTS,
            "An account with this email already exists."
        ),
        password_class = invalid_class(errors, REGISTER_PASSWORD_TOO_SHORT),
        password_short = feedback(errors, REGISTER_PASSWORD_TOO_SHORT, &password_message),
        confirm_class = invalid_class(errors, REGISTER_PASSWORDS_DIFFER),
        passwords_differ = feedback(errors, REGISTER_PASSWORDS_DIFFER, "Passwords do not match."),
    );

    page("Register", None, flash, &body)
}

/// Change-password form; entered passwords are never echoed back
pub fn change_password_page(user: &User, errors: FormErrors, flash: Option<&Flash>) -> String {
    let password_message = format!(
        "Password must be at least {} characters long.",
        MIN_PASSWORD_LENGTH
    );

    let body = format!(
        r#"<h1>Change password</h1>
        <form method="post" action="/auth/change-password">
            <label for="current-password">Current password</label>
            <input type="password" id="current-password" name="current-password" class="form-control{current_class}" autofocus>
            {current_wrong}
            <label for="new-password">New password</label>
            <input type="password" id="new-password" name="new-password" class="form-control{password_class}">
            {password_short}
            <label for="new-password-confirm">Confirm new password</label>
            <input type="password" id="new-password-confirm" name="new-password-confirm" class="form-control{confirm_class}">
            {passwords_differ}
            <div class="actions"><button type="submit">Change password</button> <a href="/maps">Cancel</a></div>
        </form>"#,
        current_class = invalid_class(errors, CHANGE_CURRENT_PASSWORD_WRONG),
        current_wrong = feedback(
            errors,
            CHANGE_CURRENT_PASSWORD_WRONG,
            "Current password is incorrect."
        ),
        password_class = invalid_class(errors, CHANGE_PASSWORD_TOO_SHORT),
        password_short = feedback(errors, CHANGE_PASSWORD_TOO_SHORT, &password_message),
        confirm_class = invalid_class(errors, CHANGE_PASSWORDS_DIFFER),
        passwords_differ = feedback(errors, CHANGE_PASSWORDS_DIFFER, "Passwords do not match."),
    );

    page("Change password", Some(user), flash, &body)
}
