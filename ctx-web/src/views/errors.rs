//! Error pages

use axum::http::StatusCode;

use super::page;

/// Generic page for a failed request; never includes error details
pub fn error_page(status: StatusCode) -> String {
    let (heading, text) = match status {
        StatusCode::NOT_FOUND => (
            "Page not found",
            "The page you are looking for does not exist or has been removed.",
        ),
        StatusCode::FORBIDDEN => (
            "Access denied",
            "You do not have permission to access this topic map.",
        ),
        StatusCode::BAD_REQUEST => ("Bad request", "The request could not be understood."),
        _ => (
            "Something went wrong",
            "An unexpected error occurred. Please try again later.",
        ),
    };

    let body = format!(
        r#"<h1>{code} {heading}</h1>
        <p>{text}</p>
        <p><a href="/">Return to the home page</a></p>"#,
        code = status.as_u16(),
        heading = heading,
        text = text
    );

    page(heading, None, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_specific_text() {
        assert!(error_page(StatusCode::NOT_FOUND).contains("404 Page not found"));
        assert!(error_page(StatusCode::FORBIDDEN).contains("403 Access denied"));
        assert!(error_page(StatusCode::INTERNAL_SERVER_ERROR).contains("500 Something went wrong"));
    }
}
