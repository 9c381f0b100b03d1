//! Elemental: Courier's structured, channel-agnostic message content.
//!
//! An [`ElementalNode`] is a union discriminated by its `type` field. Known
//! tags decode into their concrete node type; any other tag decodes into
//! [`ElementalNode::Unknown`], which keeps the raw object so it re-encodes
//! unchanged. This lets older clients pass through node types the API adds
//! later.
//!
//! ```
//! use courier::{codec, ElementalNode};
//!
//! let node: ElementalNode =
//!     codec::decode_str(r#"{"type":"text","content":"Hi","align":"left"}"#).unwrap();
//! assert!(node.is_text());
//! assert_eq!(node.as_text().unwrap().content, "Hi");
//! assert!(node.as_meta().is_err());
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::codec::{
    expect_object, field_path, optional, put_optional, required, type_error, DecodeResult,
    FromWire, ToWire, WireFields,
};
use crate::errors::DecodeError;

/// Wire value of the current Elemental content version.
pub const ELEMENTAL_VERSION: &str = "2022-01-01";

wire_enum! {
    /// Horizontal alignment of a node.
    pub enum Alignment {
        Left = "left",
        Center = "center",
        Right = "right",
        Full = "full",
    }
}

wire_enum! {
    /// Typographic style of a text or quote node.
    pub enum TextStyle {
        Text = "text",
        H1 = "h1",
        H2 = "h2",
        Subtext = "subtext",
    }
}

wire_enum! {
    pub enum TextFormat {
        Markdown = "markdown",
    }
}

wire_enum! {
    /// Rendering style of an action node.
    pub enum ActionStyle {
        Button = "button",
        Link = "link",
    }
}

wire_struct! {
    /// Fields shared by every Elemental node.
    pub struct ElementalBaseNode {
        optional {
            /// Restricts the node to these channels.
            channels: Vec<String> = "channels",
            ref_: String = "ref",
            /// Conditional expression; the node renders only when it is truthy.
            if_: String = "if",
            loop_: String = "loop",
        }
    }
}

impl Default for ElementalBaseNode {
    fn default() -> Self {
        Self::new()
    }
}

wire_struct! {
    pub struct TextLocale {
        required {
            content: String = "content",
        }
    }
}

wire_struct! {
    pub struct MetaLocale {
        required {
            title: String = "title",
        }
    }
}

wire_struct! {
    pub struct ImageLocale {
        required {
            href: String = "href",
        }
    }
}

wire_struct! {
    pub struct ActionLocale {
        optional {
            content: String = "content",
            href: String = "href",
        }
    }
}

wire_struct! {
    /// A block of text, optionally markdown-formatted.
    pub struct ElementalTextNode {
        required {
            content: String = "content",
            align: Alignment = "align",
        }
        optional {
            text_style: TextStyle = "text_style",
            color: String = "color",
            bold: String = "bold",
            italic: String = "italic",
            strikethrough: String = "strikethrough",
            underline: String = "underline",
            locales: BTreeMap<String, TextLocale> = "locales",
            format: TextFormat = "format",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

wire_struct! {
    /// Channel metadata such as an email subject or push title.
    pub struct ElementalMetaNode {
        optional {
            title: String = "title",
            locales: BTreeMap<String, MetaLocale> = "locales",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

wire_struct! {
    pub struct ElementalImageNode {
        required {
            src: String = "src",
        }
        optional {
            href: String = "href",
            align: Alignment = "align",
            alt_text: String = "altText",
            width: String = "width",
            locales: BTreeMap<String, ImageLocale> = "locales",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

wire_struct! {
    /// A button or link.
    pub struct ElementalActionNode {
        required {
            content: String = "content",
            href: String = "href",
        }
        optional {
            action_id: String = "action_id",
            align: Alignment = "align",
            background_color: String = "background_color",
            style: ActionStyle = "style",
            locales: BTreeMap<String, ActionLocale> = "locales",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

wire_struct! {
    pub struct ElementalDividerNode {
        optional {
            color: String = "color",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

wire_struct! {
    /// Groups child nodes so conditions and loops apply to all of them.
    pub struct ElementalGroupNode {
        required {
            elements: Vec<ElementalNode> = "elements",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

wire_struct! {
    pub struct ElementalQuoteNode {
        required {
            content: String = "content",
        }
        optional {
            align: Alignment = "align",
            border_color: String = "borderColor",
            text_style: TextStyle = "text_style",
            locales: BTreeMap<String, TextLocale> = "locales",
        }
        flatten {
            base: ElementalBaseNode,
        }
    }
}

/// Channel-specific content: either nested Elemental nodes or raw provider data.
///
/// `raw` is required whenever `elements` is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementalChannelNode {
    pub channel: String,
    pub elements: Option<Vec<ElementalNode>>,
    pub raw: Option<Map<String, Value>>,
    pub base: ElementalBaseNode,
}

impl ElementalChannelNode {
    pub fn with_elements(channel: impl Into<String>, elements: Vec<ElementalNode>) -> Self {
        Self {
            channel: channel.into(),
            elements: Some(elements),
            raw: None,
            base: ElementalBaseNode::default(),
        }
    }

    pub fn with_raw(channel: impl Into<String>, raw: Map<String, Value>) -> Self {
        Self {
            channel: channel.into(),
            elements: None,
            raw: Some(raw),
            base: ElementalBaseNode::default(),
        }
    }

    pub fn base(mut self, base: ElementalBaseNode) -> Self {
        self.base = base;
        self
    }
}

impl WireFields for ElementalChannelNode {
    fn decode_fields(
        obj: &Map<String, Value>,
        container: &'static str,
        path: &str,
    ) -> DecodeResult<Self> {
        let channel = required(obj, "channel", container, path)?;
        let elements: Option<Vec<ElementalNode>> = optional(obj, "elements", path)?;
        let raw = if elements.is_some() {
            optional(obj, "raw", path)?
        } else {
            Some(required(obj, "raw", container, path)?)
        };
        Ok(Self {
            channel,
            elements,
            raw,
            base: ElementalBaseNode::decode_fields(obj, container, path)?,
        })
    }

    fn encode_fields(&self, obj: &mut Map<String, Value>) {
        obj.insert("channel".to_string(), self.channel.to_wire());
        put_optional(obj, "elements", &self.elements);
        put_optional(obj, "raw", &self.raw);
        self.base.encode_fields(obj);
    }

    fn has_required(obj: &Map<String, Value>) -> bool {
        obj.contains_key("channel")
            && (obj.contains_key("elements") || obj.contains_key("raw"))
            && ElementalBaseNode::has_required(obj)
    }
}

impl FromWire for ElementalChannelNode {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        let obj = expect_object(value, path)?;
        Self::decode_fields(obj, "ElementalChannelNode", path)
    }

    fn claims(value: &Value) -> bool {
        value.as_object().is_some_and(Self::has_required)
    }
}

impl ToWire for ElementalChannelNode {
    fn to_wire(&self) -> Value {
        let mut obj = Map::new();
        self.encode_fields(&mut obj);
        Value::Object(obj)
    }
}

wire_serde!(ElementalChannelNode);

/// A single node of Elemental content, discriminated by `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementalNode {
    Text(ElementalTextNode),
    Meta(ElementalMetaNode),
    Channel(ElementalChannelNode),
    Image(ElementalImageNode),
    Action(ElementalActionNode),
    Divider(ElementalDividerNode),
    Group(ElementalGroupNode),
    Quote(ElementalQuoteNode),
    /// A node type this client does not know, kept verbatim (including `type`).
    Unknown(Map<String, Value>),
}

macro_rules! node_accessors {
    ($( $variant:ident($ty:ty) => $tag:literal, $is:ident, $as_:ident; )+) => {
        impl ElementalNode {
            /// Wire tags of every known node type.
            pub const KNOWN_TYPES: &'static [&'static str] = &[$($tag),+];

            /// The `type` tag of the active variant.
            pub fn kind(&self) -> &str {
                match self {
                    $( ElementalNode::$variant(_) => $tag, )+
                    ElementalNode::Unknown(raw) => raw
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or(UNKNOWN_TAG),
                }
            }

            $(
                pub fn $is(&self) -> bool {
                    matches!(self, ElementalNode::$variant(_))
                }

                pub fn $as_(&self) -> DecodeResult<&$ty> {
                    match self {
                        ElementalNode::$variant(node) => Ok(node),
                        other => Err(DecodeError::type_mismatch($tag, other.kind())),
                    }
                }
            )+
        }

        $(
            impl From<$ty> for ElementalNode {
                fn from(node: $ty) -> Self {
                    ElementalNode::$variant(node)
                }
            }
        )+

        fn decode_known(
            tag: &str,
            value: &Value,
            path: &str,
        ) -> Option<DecodeResult<ElementalNode>> {
            match tag {
                $( $tag => Some(<$ty>::from_wire(value, path).map(ElementalNode::$variant)), )+
                _ => None,
            }
        }
    };
}

/// Tag reported by [`ElementalNode::kind`] for an unknown node without a string tag.
pub const UNKNOWN_TAG: &str = "_unknown";

node_accessors! {
    Text(ElementalTextNode) => "text", is_text, as_text;
    Meta(ElementalMetaNode) => "meta", is_meta, as_meta;
    Channel(ElementalChannelNode) => "channel", is_channel, as_channel;
    Image(ElementalImageNode) => "image", is_image, as_image;
    Action(ElementalActionNode) => "action", is_action, as_action;
    Divider(ElementalDividerNode) => "divider", is_divider, as_divider;
    Group(ElementalGroupNode) => "group", is_group, as_group;
    Quote(ElementalQuoteNode) => "quote", is_quote, as_quote;
}

impl ElementalNode {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ElementalNode::Unknown(_))
    }

    /// The raw object of an unrecognized node.
    pub fn as_unknown(&self) -> DecodeResult<&Map<String, Value>> {
        match self {
            ElementalNode::Unknown(raw) => Ok(raw),
            other => Err(DecodeError::type_mismatch(UNKNOWN_TAG, other.kind())),
        }
    }

    /// Shorthand for a left-aligned text node.
    pub fn text(content: impl Into<String>) -> Self {
        ElementalNode::Text(ElementalTextNode::new(content, Alignment::Left))
    }
}

impl FromWire for ElementalNode {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        let obj = expect_object(value, path)?;
        let tag = match obj.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(tag)) => Some(tag.as_str()),
            Some(other) => return Err(type_error("string", other, &field_path(path, "type"))),
        };
        let tag = match tag {
            Some(tag) if !tag.trim().is_empty() => tag,
            _ => {
                return Err(DecodeError::MissingDiscriminant {
                    union: "ElementalNode".to_string(),
                    field: "type".to_string(),
                    path: path.to_string(),
                })
            }
        };

        match decode_known(tag, value, path) {
            Some(decoded) => decoded,
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!(tag, path, "keeping unknown elemental node verbatim");
                Ok(ElementalNode::Unknown(obj.clone()))
            }
        }
    }
}

impl ToWire for ElementalNode {
    fn to_wire(&self) -> Value {
        let (tag, fields) = match self {
            ElementalNode::Unknown(raw) => return Value::Object(raw.clone()),
            ElementalNode::Text(node) => ("text", node.to_wire()),
            ElementalNode::Meta(node) => ("meta", node.to_wire()),
            ElementalNode::Channel(node) => ("channel", node.to_wire()),
            ElementalNode::Image(node) => ("image", node.to_wire()),
            ElementalNode::Action(node) => ("action", node.to_wire()),
            ElementalNode::Divider(node) => ("divider", node.to_wire()),
            ElementalNode::Group(node) => ("group", node.to_wire()),
            ElementalNode::Quote(node) => ("quote", node.to_wire()),
        };
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(tag.to_string()));
        if let Value::Object(fields) = fields {
            obj.extend(fields);
        }
        Value::Object(obj)
    }
}

wire_serde!(ElementalNode);

wire_struct! {
    /// Full Elemental content: a versioned list of nodes.
    pub struct ElementalContent {
        required {
            version: String = "version",
            elements: Vec<ElementalNode> = "elements",
        }
        optional {
            brand: String = "brand",
        }
    }
}

impl ElementalContent {
    /// Content at the current Elemental version.
    pub fn current(elements: Vec<ElementalNode>) -> Self {
        Self::new(ELEMENTAL_VERSION, elements)
    }
}

wire_struct! {
    /// Shorthand content with just a title and body.
    pub struct ElementalContentSugar {
        required {
            title: String = "title",
            body: String = "body",
        }
    }
}

wire_union! {
    /// Message content: full Elemental or the title/body shorthand.
    pub enum Content {
        Elemental(ElementalContent) [is_elemental, as_elemental],
        Sugar(ElementalContentSugar) [is_sugar, as_sugar],
    }
}
