use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;

/// Reads the HTML template at `path` and substitutes caller-supplied values.
///
/// Every literal `{{ key }}` (double braces, one space either side) is
/// replaced with the value for `key`. A second pass replaces any pattern
/// still left for that key with the empty string; under normal use the
/// first pass already consumed them all, this only matters if a value
/// somehow reintroduces the pattern. Placeholders for keys that were never
/// supplied stay in the output verbatim. Values are inserted as-is, with no
/// HTML escaping.
pub fn render_template(path: &Path, values: &HashMap<String, String>) -> io::Result<String> {
    let mut html = fs::read_to_string(path)?;

    for (key, value) in values {
        let placeholder = format!("{{{{ {} }}}}", key);
        html = html.replace(&placeholder, value);
        html = html.replace(&placeholder, "");
    }

    debug!("Rendered template {} with {} values", path.display(), values.len());
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_template(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.html");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_simple_substitution() {
        let (_dir, path) = write_template("Hello {{ name }}!");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "World".to_string());

        let html = render_template(&path, &values).unwrap();
        assert_eq!(html, "Hello World!");
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let (_dir, path) = write_template("{{ x }} and {{ x }} and {{ x }}");
        let mut values = HashMap::new();
        values.insert("x".to_string(), "y".to_string());

        let html = render_template(&path, &values).unwrap();
        assert_eq!(html, "y and y and y");
    }

    #[test]
    fn test_unmapped_placeholder_stays_verbatim() {
        let (_dir, path) = write_template("<p>{{ foo }}</p>");
        let values = HashMap::new();

        let html = render_template(&path, &values).unwrap();
        assert_eq!(html, "<p>{{ foo }}</p>");
    }

    #[test]
    fn test_extra_keys_ignored() {
        let (_dir, path) = write_template("static content");
        let mut values = HashMap::new();
        values.insert("unused".to_string(), "value".to_string());

        let html = render_template(&path, &values).unwrap();
        assert_eq!(html, "static content");
    }

    #[test]
    fn test_spacing_must_match_exactly() {
        // {{name}} and {{  name  }} are not the placeholder pattern
        let (_dir, path) = write_template("{{name}} {{ name }} {{  name  }}");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "x".to_string());

        let html = render_template(&path, &values).unwrap();
        assert_eq!(html, "{{name}} x {{  name  }}");
    }

    #[test]
    fn test_no_html_escaping() {
        let (_dir, path) = write_template("{{ body }}");
        let mut values = HashMap::new();
        values.insert("body".to_string(), "<b>&amp;</b>".to_string());

        let html = render_template(&path, &values).unwrap();
        assert_eq!(html, "<b>&amp;</b>");
    }

    #[test]
    fn test_missing_template_is_io_error() {
        let values = HashMap::new();
        let result = render_template(Path::new("/nonexistent/template.html"), &values);
        assert!(result.is_err());
    }

    #[test]
    fn test_bundled_template_has_documented_placeholders() {
        let html = fs::read_to_string(crate::config::default_template_path()).unwrap();
        assert!(html.contains("{{ msg_header }}"));
        assert!(html.contains("{{ msg_title }}"));
        assert!(html.contains("{{ msg_body }}"));
    }
}
