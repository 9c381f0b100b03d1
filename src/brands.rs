//! Brands: reusable email and inbox styling.
//!
//! Many brand template fields distinguish "not sent" from an explicit
//! `null` (which clears the stored value), so they are [`Tristate`].
//!
//! [`Tristate`]: crate::codec::Tristate

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    common::Paging,
    errors::{Error, Result, ValidationError},
    http::{path_segment, RequestOptions},
};

wire_struct! {
    pub struct BrandColors {
        optional {
            primary: String = "primary",
            secondary: String = "secondary",
        }
    }
}

wire_struct! {
    pub struct BrandTemplate {
        required {
            enabled: bool = "enabled",
        }
        nullable {
            background_color: String = "backgroundColor",
            blocks_background_color: String = "blocksBackgroundColor",
            footer: String = "footer",
            head: String = "head",
            header: String = "header",
            width: String = "width",
        }
    }
}

wire_struct! {
    /// A brand template with an additional MJML override.
    pub struct BrandTemplateOverride {
        required {
            enabled: bool = "enabled",
        }
        optional {
            mjml: BrandTemplate = "mjml",
            footer_background_color: String = "footerBackgroundColor",
            footer_full_width: bool = "footerFullWidth",
        }
        nullable {
            background_color: String = "backgroundColor",
            blocks_background_color: String = "blocksBackgroundColor",
            footer: String = "footer",
            head: String = "head",
            header: String = "header",
            width: String = "width",
        }
    }
}

wire_struct! {
    pub struct EmailHead {
        required {
            inherit_default: bool = "inheritDefault",
        }
        nullable {
            content: String = "content",
        }
    }
}

wire_struct! {
    pub struct EmailFooter {
        nullable {
            content: String = "content",
            inherit_default: bool = "inheritDefault",
        }
    }
}

wire_struct! {
    pub struct Logo {
        nullable {
            href: String = "href",
            image: String = "image",
        }
    }
}

wire_struct! {
    pub struct EmailHeader {
        required {
            logo: Logo = "logo",
        }
        nullable {
            inherit_default: bool = "inheritDefault",
            bar_color: String = "barColor",
        }
    }
}

wire_struct! {
    pub struct BrandSettingsEmail {
        optional {
            template_override: BrandTemplateOverride = "templateOverride",
            head: EmailHead = "head",
            footer: EmailFooter = "footer",
            header: EmailHeader = "header",
        }
    }
}

wire_enum! {
    pub enum InAppPlacement {
        Top = "top",
        Bottom = "bottom",
        Left = "left",
        Right = "right",
    }
}

wire_struct! {
    pub struct WidgetBackground {
        nullable {
            top_color: String = "topColor",
            bottom_color: String = "bottomColor",
        }
    }
}

wire_struct! {
    pub struct BrandSettingsInApp {
        required {
            colors: BrandColors = "colors",
            widget_background: WidgetBackground = "widgetBackground",
        }
        optional {
            placement: InAppPlacement = "placement",
        }
        nullable {
            border_radius: String = "borderRadius",
            disable_message_icon: bool = "disableMessageIcon",
            font_family: String = "fontFamily",
        }
    }
}

wire_struct! {
    pub struct BrandSettings {
        optional {
            colors: BrandColors = "colors",
            email: BrandSettingsEmail = "email",
            inapp: BrandSettingsInApp = "inapp",
        }
    }
}

wire_struct! {
    /// A named template snippet available to messages sent with the brand.
    pub struct BrandSnippet {
        required {
            name: String = "name",
            value: String = "value",
        }
    }
}

wire_struct! {
    pub struct BrandSnippets {
        required {
            items: Vec<BrandSnippet> = "items",
        }
    }
}

wire_struct! {
    pub struct Brand {
        required {
            id: String = "id",
            name: String = "name",
            created: i64 = "created",
            updated: i64 = "updated",
        }
        optional {
            settings: BrandSettings = "settings",
            snippets: BrandSnippets = "snippets",
            version: String = "version",
        }
        nullable {
            published: i64 = "published",
        }
    }
}

wire_struct! {
    /// Body of `POST /brands`.
    pub struct BrandParameters {
        required {
            name: String = "name",
        }
        optional {
            id: String = "id",
            settings: BrandSettings = "settings",
            snippets: BrandSnippets = "snippets",
        }
    }
}

wire_struct! {
    /// Body of `PUT /brands/{brand_id}`.
    pub struct BrandUpdateParameters {
        required {
            name: String = "name",
        }
        optional {
            settings: BrandSettings = "settings",
            snippets: BrandSnippets = "snippets",
        }
    }
}

wire_struct! {
    pub struct BrandsResponse {
        required {
            paging: Paging = "paging",
            results: Vec<Brand> = "results",
        }
    }
}

/// Client for `/brands`.
#[derive(Clone)]
pub struct BrandsClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl BrandsClient {
    pub async fn create(&self, params: BrandParameters) -> Result<Brand> {
        validate_name(&params.name)?;
        self.inner
            .send_json(Method::POST, "/brands", &params, &RequestOptions::default())
            .await
    }

    pub async fn get(&self, brand_id: &str) -> Result<Brand> {
        let path = format!("/brands/{}", path_segment("brand_id", brand_id)?);
        self.inner.get(&path, &[]).await
    }

    pub async fn list(&self, cursor: Option<&str>) -> Result<BrandsResponse> {
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get("/brands", &query).await
    }

    /// Replace a brand's name, settings and snippets.
    pub async fn replace(&self, brand_id: &str, params: BrandUpdateParameters) -> Result<Brand> {
        validate_name(&params.name)?;
        let path = format!("/brands/{}", path_segment("brand_id", brand_id)?);
        self.inner
            .send_json(Method::PUT, &path, &params, &RequestOptions::default())
            .await
    }

    pub async fn delete(&self, brand_id: &str) -> Result<()> {
        let path = format!("/brands/{}", path_segment("brand_id", brand_id)?);
        self.inner.delete(&path).await
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(
            ValidationError::new("name is required").with_field("name"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_value, encode_value, Tristate};
    use serde_json::json;

    #[test]
    fn template_background_color_keeps_three_states() {
        let absent: BrandTemplate = decode_value(&json!({"enabled": true})).unwrap();
        let null: BrandTemplate =
            decode_value(&json!({"enabled": true, "backgroundColor": null})).unwrap();
        let set: BrandTemplate =
            decode_value(&json!({"enabled": true, "backgroundColor": "#fff"})).unwrap();

        assert_eq!(absent.background_color, Tristate::Absent);
        assert_eq!(null.background_color, Tristate::Null);
        assert_eq!(set.background_color, Tristate::Value("#fff".to_string()));

        assert_eq!(encode_value(&absent), json!({"enabled": true}));
        assert_eq!(
            encode_value(&null),
            json!({"enabled": true, "backgroundColor": null})
        );
        assert_eq!(
            encode_value(&set),
            json!({"enabled": true, "backgroundColor": "#fff"})
        );
    }

    #[test]
    fn brand_decodes_nested_settings() {
        let brand: Brand = decode_value(&json!({
            "id": "b1",
            "name": "Acme",
            "created": 1700000000000i64,
            "updated": 1700000000001i64,
            "published": null,
            "settings": {
                "colors": {"primary": "#111"},
                "email": {
                    "header": {"logo": {"href": null, "image": "https://cdn/logo.png"}},
                    "templateOverride": {"enabled": false, "mjml": {"enabled": true}}
                },
                "inapp": {
                    "colors": {},
                    "widgetBackground": {"topColor": "#000"},
                    "placement": "bottom"
                }
            }
        }))
        .unwrap();

        assert!(brand.published.is_null());
        let settings = brand.settings.as_ref().unwrap();
        let email = settings.email.as_ref().unwrap();
        assert!(email.header.as_ref().unwrap().logo.href.is_null());
        assert!(email.template_override.as_ref().unwrap().mjml.is_some());
        assert_eq!(
            settings.inapp.as_ref().unwrap().placement,
            Some(InAppPlacement::Bottom)
        );
    }

    #[test]
    fn template_requires_enabled() {
        let err = decode_value::<BrandTemplate>(&json!({"backgroundColor": "#fff"})).unwrap_err();
        assert!(matches!(
            err,
            crate::DecodeError::MissingField { ref field, .. } if field == "enabled"
        ));
    }
}
