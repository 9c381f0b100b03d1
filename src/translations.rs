//! Translation files (`.po` text) per domain and locale.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::{Body, ClientInner},
    errors::Result,
    http::{path_segment, RequestOptions},
};

/// Client for `/translations`.
#[derive(Clone)]
pub struct TranslationsClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl TranslationsClient {
    /// Fetch the `.po` file for a domain and locale.
    pub async fn get(&self, domain: &str, locale: &str) -> Result<String> {
        let path = translation_path(domain, locale)?;
        let resp = self
            .inner
            .request(Method::GET, &path, &[], None, &RequestOptions::default())
            .await?;
        Ok(resp.text()?)
    }

    /// Upload a `.po` file, replacing the current one.
    pub async fn update(&self, domain: &str, locale: &str, po: impl Into<String>) -> Result<()> {
        let path = translation_path(domain, locale)?;
        self.inner
            .execute(
                Method::PUT,
                &path,
                &[],
                Some(Body::Text(po.into())),
                &RequestOptions::default(),
            )
            .await
    }
}

fn translation_path(domain: &str, locale: &str) -> Result<String> {
    Ok(format!(
        "/translations/{}/{}",
        path_segment("domain", domain)?,
        path_segment("locale", locale)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn path_requires_domain_and_locale() {
        assert_eq!(
            translation_path("default", "pt-BR").unwrap(),
            "/translations/default/pt-BR"
        );
        let err = translation_path("default", "").unwrap_err();
        assert!(matches!(err, Error::Validation(ref v) if v.field.as_deref() == Some("locale")));
    }
}
