use crate::error::ParseError;
use crate::types::MappingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedMapping {
    pub mapping: MappingConfig,
    pub format: DocumentFormat,
}

pub fn parse_mapping_str(input: &str, format: DocumentFormat) -> Result<ParsedMapping, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedMapping {
            mapping: serde_json::from_str::<MappingConfig>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedMapping {
            mapping: serde_yaml::from_str::<MappingConfig>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_mapping_auto(input),
    }
}

fn parse_mapping_auto(input: &str) -> Result<ParsedMapping, ParseError> {
    // JSON documents always open with `{` once leading whitespace is gone.
    if input.trim_start().starts_with('{') {
        return match serde_json::from_str::<MappingConfig>(input) {
            Ok(mapping) => Ok(ParsedMapping {
                mapping,
                format: DocumentFormat::Json,
            }),
            Err(e) => serde_yaml::from_str::<MappingConfig>(input)
                .map(|mapping| ParsedMapping {
                    mapping,
                    format: DocumentFormat::Yaml,
                })
                .map_err(|_| ParseError::Json(e)),
        };
    }

    match serde_yaml::from_str::<MappingConfig>(input) {
        Ok(mapping) => Ok(ParsedMapping {
            mapping,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => serde_json::from_str::<MappingConfig>(input)
            .map(|mapping| ParsedMapping {
                mapping,
                format: DocumentFormat::Json,
            })
            .map_err(|_| ParseError::Yaml(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json() {
        let doc = r#"{"id":"m1","targetApi":{"url":"https://api.example.com/x","method":"POST"}}"#;
        let parsed = parse_mapping_str(doc, DocumentFormat::Auto).unwrap();
        assert_eq!(parsed.format, DocumentFormat::Json);
        assert_eq!(parsed.mapping.id, "m1");
    }

    #[test]
    fn detects_yaml() {
        let doc = "id: m2\ntargetApi:\n  url: https://api.example.com/y\n  method: get\n";
        let parsed = parse_mapping_str(doc, DocumentFormat::Auto).unwrap();
        assert_eq!(parsed.format, DocumentFormat::Yaml);
        assert_eq!(parsed.mapping.id, "m2");
    }

    #[test]
    fn reports_yaml_error_for_garbage() {
        let err = parse_mapping_str("id: [unclosed", DocumentFormat::Auto).unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }
}
