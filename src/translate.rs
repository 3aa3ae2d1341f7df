use anyhow::{Context, Result};
use async_trait::async_trait;
use language_tags::LanguageTag;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranslateConfig;

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Target used when a command names no language
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Resolve a user-supplied language code into a BCP-47 tag.
///
/// `_` is accepted as a subtag separator, so `pt_BR` resolves to `pt-BR`.
pub fn target_language(code: &str) -> Result<LanguageTag> {
    let code = code.trim().replace('_', "-");
    let code = if code.is_empty() {
        DEFAULT_TARGET_LANGUAGE
    } else {
        code.as_str()
    };

    LanguageTag::parse(code)
        .map_err(|e| anyhow::anyhow!("Invalid language tag {:?}: {}", code, e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    pub detected_source_language: Option<String>,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &LanguageTag) -> Result<Translation>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: Vec<&'a str>,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

/// Google Cloud Translation (v2 REST) client authenticated by API key
pub struct GoogleTranslator {
    client: reqwest::Client,
    config: TranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &LanguageTag) -> Result<Translation> {
        let request = TranslateRequest {
            q: vec![text],
            target: target.as_str(),
            format: "text",
        };

        let url = format!(
            "{}/language/translate/v2",
            self.config.base_url.trim_end_matches('/')
        );

        debug!("Sending translate request to {} (target {})", url, target);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to translate API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Translate API error ({}): {}", status, error_body);
        }

        let translate_response: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse translate API response")?;

        translate_response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| Translation {
                text: t.translated_text,
                detected_source_language: t.detected_source_language,
            })
            .context("No translation in translate API response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn translator(base_url: String) -> GoogleTranslator {
        GoogleTranslator::new(TranslateConfig {
            api_key: "test-key".to_string(),
            base_url,
        })
    }

    #[test]
    fn test_empty_code_defaults_to_english() {
        assert_eq!(target_language("").unwrap().as_str(), "en");
        assert_eq!(target_language("  ").unwrap().as_str(), "en");
    }

    #[test]
    fn test_valid_codes() {
        assert_eq!(target_language("fr").unwrap().as_str(), "fr");
        assert_eq!(target_language("zh-Hant").unwrap().as_str(), "zh-Hant");
        assert_eq!(target_language(" es ").unwrap().as_str(), "es");
    }

    #[test]
    fn test_underscore_separator() {
        assert_eq!(target_language("pt_BR").unwrap().as_str(), "pt-BR");
        assert_eq!(target_language("zh_Hant_TW").unwrap().as_str(), "zh-Hant-TW");
    }

    #[test]
    fn test_invalid_code_is_error() {
        assert!(target_language("not a language").is_err());
        assert!(target_language("fr_FR!").is_err());
        assert!(target_language("toolonglanguage").is_err());
    }

    #[tokio::test]
    async fn test_translate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/language/translate/v2")
            .match_header("x-goog-api-key", "test-key")
            .match_query(Matcher::Missing)
            .match_body(Matcher::Json(serde_json::json!({
                "q": ["hola mundo"],
                "target": "en",
                "format": "text"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"translations":[{"translatedText":"hello world","detectedSourceLanguage":"es"}]}}"#,
            )
            .create_async()
            .await;

        let target = target_language("").unwrap();
        let result = translator(server.url())
            .translate("hola mundo", &target)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.text, "hello world");
        assert_eq!(result.detected_source_language.as_deref(), Some("es"));
    }

    #[tokio::test]
    async fn test_translate_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/language/translate/v2")
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid."}}"#)
            .create_async()
            .await;

        let target = target_language("fr").unwrap();
        let err = translator(server.url())
            .translate("hello", &target)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("API key not valid."));
    }

    #[tokio::test]
    async fn test_connection_error_does_not_leak_api_key() {
        let translator = GoogleTranslator::new(TranslateConfig {
            api_key: "SECRET-KEY".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
        });

        let target = target_language("fr").unwrap();
        let err = translator.translate("hello", &target).await.unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Failed to send request"));
        assert!(!message.contains("SECRET-KEY"));
    }

    #[tokio::test]
    async fn test_api_error_does_not_leak_api_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/language/translate/v2")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"forbidden"}}"#)
            .create_async()
            .await;

        let target = target_language("fr").unwrap();
        let err = translator(server.url())
            .translate("hello", &target)
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("403"));
        assert!(!message.contains("test-key"));
    }

    #[tokio::test]
    async fn test_translate_empty_result_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/language/translate/v2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"translations":[]}}"#)
            .create_async()
            .await;

        let target = target_language("de").unwrap();
        let result = translator(format!("{}/", server.url()))
            .translate("hello", &target)
            .await;

        assert!(result.is_err());
    }
}
