use crate::Error;
use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

pub trait PageTokenable<P>
where
    P: PageToken<P>,
{
    fn page_token(&self) -> P;
}

pub trait PageToken<T> {
    // Serializes self into a string.
    fn serialize_page_token(&self) -> Result<String, Error>;

    // Deserializes string into some type T.
    fn deserialize_page_token(input: &str) -> Result<Option<T>, Error>;
}

// Implement page token for all serializable/deserializable types.
impl<T> PageToken<T> for T
where
    T: Serialize + DeserializeOwned,
{
    fn serialize_page_token(&self) -> Result<String, Error> {
        let json = serde_json::to_string(self)
            .context("serialization page token to json failed")
            .map_err(Error::PageToken)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn deserialize_page_token(input: &str) -> Result<Option<T>, Error> {
        if input.is_empty() {
            return Ok(None);
        }
        let octets = URL_SAFE_NO_PAD
            .decode(input)
            .context("decoding input as base64 failed")
            .map_err(Error::PageToken)?;
        let deserialized = serde_json::from_slice(&octets)
            .context("deserializing json to page token struct failed")
            .map_err(Error::PageToken)?;
        Ok(Some(deserialized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TestToken {
        cursor: i64,
        id: String,
    }

    #[test]
    pub fn empty_input_is_first_page() {
        assert_eq!(TestToken::deserialize_page_token("").unwrap(), None);
    }

    #[test]
    pub fn token_survives_query_string() {
        let token = TestToken {
            cursor: 42,
            id: "pay_29QQoUBi66xm2f".to_string(),
        };
        let serialized = token.serialize_page_token().unwrap();
        assert!(serialized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(
            TestToken::deserialize_page_token(&serialized).unwrap(),
            Some(token)
        );
    }

    #[test]
    pub fn garbage_is_rejected() {
        assert!(matches!(
            TestToken::deserialize_page_token("not*base64"),
            Err(Error::PageToken(_))
        ));
    }
}
