use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_data_display() {
        let err = Error::InvalidData("2 artists but 1 id".to_string());
        assert_eq!(err.to_string(), "invalid data: 2 artists but 1 id");
    }
}
