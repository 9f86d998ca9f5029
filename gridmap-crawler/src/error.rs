use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("WebDriver error: {0}")]
    DriverError(#[from] thirtyfour::error::WebDriverError),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
