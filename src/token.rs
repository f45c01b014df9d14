use std::fmt;
use std::sync::{Arc, LazyLock};

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error};

use crate::error::{CheckerError, Result};
use crate::session::Session;

pub const SIGNUP_PATH: &str = "/signup";

static AUTO_CHECK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"auto-check[src="/signup_check/username"]"#).expect("static selector")
});

/// Anti-forgery token sent with every availability check.
///
/// Immutable once fetched; clones share the same allocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Arc<str>);

impl Token {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Token(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"<redacted>").finish()
    }
}

/// Fetch the signup page and pull the authenticity token out of it.
pub async fn fetch_token(session: &Session) -> Result<Token> {
    let url = session.url(SIGNUP_PATH)?;
    debug!("Requesting signup page: {}", url);

    let body = session.client().get(url).send().await?.text().await?;

    extract_token(&body).inspect_err(|_| {
        error!("Signup page did not contain the username auto-check element");
    })
}

/// Locate `<auto-check src="/signup_check/username">` and read the `value` of
/// its second element child (the hidden csrf input).
pub fn extract_token(html: &str) -> Result<Token> {
    let document = Html::parse_document(html);

    let auto_check = document
        .select(&AUTO_CHECK)
        .next()
        .ok_or(CheckerError::TokenNotFound)?;

    auto_check
        .children()
        .filter_map(ElementRef::wrap)
        .nth(1)
        .and_then(|input| input.value().attr("value"))
        .map(Token::new)
        .ok_or(CheckerError::TokenNotFound)
}
