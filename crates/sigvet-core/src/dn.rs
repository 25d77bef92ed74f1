//! Splitting rendered X.500 distinguished names into components.

/// One `attribute=value` component of a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnComponent {
    /// Attribute type, uppercased (e.g. `CN`, `O`, `OU`).
    pub attribute: String,
    /// Attribute value, with surrounding quotes removed.
    pub value: String,
}

/// Split a rendered DN such as `CN=Acme Corp, O="Acme, Inc.", C=US`
/// into its components.
///
/// Commas and semicolons separate components unless they appear inside
/// double quotes or are escaped with a backslash. Segments without an
/// `=` are dropped.
#[must_use]
pub fn split_components(dn: &str) -> Vec<DnComponent> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in dn.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' | ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);

    segments
        .iter()
        .filter_map(|segment| {
            let (attribute, value) = segment.split_once('=')?;
            Some(DnComponent {
                attribute: attribute.trim().to_ascii_uppercase(),
                value: value.trim().to_owned(),
            })
        })
        .collect()
}

/// Return the value of the first `CN` component of `dn`, if any.
///
/// A subject can legitimately carry more than one CN; only the first
/// one names the publisher. Later CNs are ignored entirely.
#[must_use]
pub fn first_common_name(dn: &str) -> Option<String> {
    split_components(dn)
        .into_iter()
        .find(|c| c.attribute == "CN")
        .map(|c| c.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_dn() {
        let parts = split_components("CN=Acme Software Inc, O=Acme, C=US");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].attribute, "CN");
        assert_eq!(parts[0].value, "Acme Software Inc");
        assert_eq!(parts[2].attribute, "C");
    }

    #[test]
    fn quoted_comma_does_not_split() {
        let parts = split_components(r#"CN=Acme, O="Acme, Inc.", C=US"#);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].value, "Acme, Inc.");
    }

    #[test]
    fn escaped_comma_does_not_split() {
        let parts = split_components(r"CN=Acme\, Inc, C=US");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].value, "Acme, Inc");
    }

    #[test]
    fn first_cn_wins_over_later_cns() {
        let cn = first_common_name("CN=Acme Software Inc (TEST), CN=Some Other CN, O=Acme");
        assert_eq!(cn.as_deref(), Some("Acme Software Inc (TEST)"));
    }

    #[test]
    fn attribute_type_is_case_insensitive() {
        let cn = first_common_name("cn=Acme, o=Acme");
        assert_eq!(cn.as_deref(), Some("Acme"));
    }

    #[test]
    fn no_cn_yields_none() {
        assert_eq!(first_common_name("O=Acme, C=US"), None);
        assert_eq!(first_common_name(""), None);
    }

    #[test]
    fn spaces_around_equals_are_trimmed() {
        let cn = first_common_name("CN = Acme Software Inc (TEST), CN = Some Other CN");
        assert_eq!(cn.as_deref(), Some("Acme Software Inc (TEST)"));
    }
}
