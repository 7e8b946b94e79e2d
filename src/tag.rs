//! Field directive parsing
//!
//! A directive is `name[,flag]*`, e.g. `#[edge("sub,inline,prefix")]`.
//! A name of `-` excludes the field. Unknown flags are ignored.

use std::borrow::Cow;

/// Marshalling options for one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// Edge name override; empty means "use the field name"
    pub name: String,

    /// Skip the field when its value is blank instead of failing
    pub omit_empty: bool,

    /// Flatten a nested struct's fields into the parent node
    pub inline: bool,

    /// With `inline`, name flattened edges `name_subedge`
    pub prefix: bool,

    /// Exclude the field entirely (`-`)
    pub ignore: bool,

    /// Reserved
    pub facets: bool,

    /// Reserved
    pub index: bool,
}

/// Parse a raw directive. Never fails.
pub fn parse_tag(raw: &str) -> TagOptions {
    let mut segments = raw.split(',');
    let name = segments.next().unwrap_or_default().trim();

    let mut options = TagOptions {
        name: name.to_string(),
        ignore: name == "-",
        ..TagOptions::default()
    };

    for flag in segments {
        match flag.trim() {
            "omitempty" => options.omit_empty = true,
            "inline" => options.inline = true,
            "prefix" => options.prefix = true,
            "facets" => options.facets = true,
            "index" => options.index = true,
            _ => {}
        }
    }

    options
}

/// Default edge name for a field: lowercased, `.` replaced by `_`
pub fn normalize_name(field: &str) -> String {
    field.to_lowercase().replace('.', "_")
}

/// Pick the directive in effect for a field.
///
/// An explicit edge directive wins, then the serialization directive, then
/// the normalized field name.
pub fn effective_directive<'a>(
    explicit: Option<&'a str>,
    serialization: Option<&'a str>,
    field: &str,
) -> Cow<'a, str> {
    explicit
        .filter(|d| !d.is_empty())
        .or_else(|| serialization.filter(|d| !d.is_empty()))
        .map(Cow::Borrowed)
        .unwrap_or_else(|| Cow::Owned(normalize_name(field)))
}
