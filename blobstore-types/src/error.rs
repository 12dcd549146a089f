use http::HeaderName;

/// Errors that occur while populating a [`BlobMetadata`](crate::BlobMetadata) from headers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header required to build the metadata record is absent.
    #[error("{0} not found in headers")]
    MissingHeader(HeaderName),
}

impl Error {
    /// Returns the name of the header this error refers to.
    pub fn header_name(&self) -> &HeaderName {
        match self {
            Error::MissingHeader(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn missing_header_names_the_header() {
        let err = Error::MissingHeader(CONTENT_TYPE);
        assert_eq!(err.to_string(), "content-type not found in headers");
        assert_eq!(err.header_name(), &CONTENT_TYPE);
    }
}
