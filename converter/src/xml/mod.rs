//! Streaming, indentation-tracking XML writer.
//!
//! ## Format
//!
//! ```text
//! <Images>
//! 	<image Identifiant="...">
//! 		<StudyID>...</StudyID>
//! 		<Labels>
//! 			<Label>normal</Label>
//! 		</Labels>
//! 	</image>
//! </Images>
//! ```
//!
//! Each written line is prefixed by one tab per open element. The writer is
//! append-only: whatever reached the sink before a failure stays there.

use std::borrow::Cow;
use std::io::{self, Write};

/// One indentation unit per depth level.
pub const INDENT: &str = "\t";

/// Incremental XML writer with explicit enter/exit of elements.
pub struct XmlEmitter<W: Write> {
    out: W,
    /// Names of the currently open elements, innermost last.
    open: Vec<String>,
    line: String,
}

impl<W: Write> XmlEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            open: Vec::new(),
            line: String::new(),
        }
    }

    /// Current indentation depth.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// XML declaration and a DOCTYPE pointing at an external DTD.
    pub fn declaration(&mut self, root: &str, dtd: &str) -> io::Result<()> {
        self.write_line("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        self.write_line(&format!("<!DOCTYPE {} SYSTEM \"{}\">", root, escape_attribute(dtd)))
    }

    /// Open `<name>` and indent everything after it.
    pub fn enter(&mut self, name: &str) -> io::Result<()> {
        self.write_line(&format!("<{}>", name))?;
        self.open.push(name.to_string());
        Ok(())
    }

    /// Open `<name attribute="value">` and indent everything after it.
    pub fn enter_with_attribute(
        &mut self,
        name: &str,
        attribute: &str,
        value: &str,
    ) -> io::Result<()> {
        self.write_line(&format!("<{} {}=\"{}\">", name, attribute, escape_attribute(value)))?;
        self.open.push(name.to_string());
        Ok(())
    }

    /// Close the innermost open element.
    pub fn exit(&mut self) -> io::Result<()> {
        let name = self.open.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no open XML element to close")
        })?;
        self.write_line(&format!("</{}>", name))
    }

    /// Write `<name>value</name>` on one line, depth unchanged.
    pub fn leaf(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.write_line(&format!("<{}>{}</{}>", name, escape_text(value), name))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Give back the sink. Open elements are left unclosed.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, content: &str) -> io::Result<()> {
        self.line.clear();
        for _ in 0..self.open.len() {
            self.line.push_str(INDENT);
        }
        self.line.push_str(content);
        self.line.push('\n');
        self.out.write_all(self.line.as_bytes())
    }
}

/// Escape character data.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}

/// Escape a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(escape_text(value).replace('"', "&quot;"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(emitter: XmlEmitter<Vec<u8>>) -> String {
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_nested_indentation() {
        let mut xml = XmlEmitter::new(Vec::new());
        xml.enter("Images").unwrap();
        xml.enter_with_attribute("image", "Identifiant", "abc").unwrap();
        xml.leaf("StudyID", "42").unwrap();
        xml.enter("Labels").unwrap();
        xml.leaf("Label", "normal").unwrap();
        assert_eq!(xml.depth(), 3);
        xml.exit().unwrap();
        xml.exit().unwrap();
        xml.exit().unwrap();
        assert_eq!(xml.depth(), 0);

        assert_eq!(
            output(xml),
            "<Images>\n\
             \t<image Identifiant=\"abc\">\n\
             \t\t<StudyID>42</StudyID>\n\
             \t\t<Labels>\n\
             \t\t\t<Label>normal</Label>\n\
             \t\t</Labels>\n\
             \t</image>\n\
             </Images>\n"
        );
    }

    #[test]
    fn test_declaration() {
        let mut xml = XmlEmitter::new(Vec::new());
        xml.declaration("Images", "../structures/images.dtd").unwrap();
        assert_eq!(
            output(xml),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE Images SYSTEM \"../structures/images.dtd\">\n"
        );
    }

    #[test]
    fn test_exit_without_open_element() {
        let mut xml = XmlEmitter::new(Vec::new());
        let err = xml.exit().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(output(xml).is_empty());
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert!(matches!(escape_text("plain 'text' \"ok\""), Cow::Borrowed(_)));
        assert_eq!(escape_attribute("say \"hi\" & go"), "say &quot;hi&quot; &amp; go");

        let mut xml = XmlEmitter::new(Vec::new());
        xml.leaf("Report", "size <5mm").unwrap();
        assert_eq!(output(xml), "<Report>size &lt;5mm</Report>\n");
    }

    struct FailAfter {
        written: Vec<u8>,
        budget: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.budget -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_written_lines_survive_failure() {
        let mut xml = XmlEmitter::new(FailAfter { written: Vec::new(), budget: 1 });
        xml.enter("Images").unwrap();
        assert!(xml.leaf("a", "b").is_err());
        assert_eq!(xml.get_ref().written, b"<Images>\n");
    }
}
