use std::fmt::Display;

#[derive(Debug, Hash, Clone)]
pub struct HtmlElement {
    tag: HtmlTag,
    header: Vec<(String, String)>,
    content: Vec<HtmlContent>,
}

impl HtmlElement {
    pub fn new(tag: HtmlTag) -> Self {
        Self {
            tag,
            header: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn class(mut self, classes: impl Into<String>) -> Self {
        self.header
            .push(("class".to_string(), escape_attribute(&classes.into())));
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.header
            .push(("id".to_string(), escape_attribute(&id.into())));
        self
    }

    pub fn header(mut self, title: impl Into<String>, value: impl Into<String>) -> Self {
        self.header
            .push((title.into(), escape_attribute(&value.into())));
        self
    }

    pub fn content(mut self, content: impl ToHtmlContent) -> Self {
        content.add_to(&mut self.content);
        self
    }
}

impl Display for HtmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (title, value) in &self.header {
            write!(f, " {title}='{value}'")?;
        }
        write!(f, ">")?;
        if self.tag.is_void() {
            return Ok(());
        }
        for item in &self.content {
            write!(f, "{item}")?;
        }
        write!(f, "</{}>", self.tag)
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
}

pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub trait ToHtmlContent {
    fn add_to(self, content: &mut Vec<HtmlContent>);
}

impl ToHtmlContent for HtmlContent {
    fn add_to(self, content: &mut Vec<HtmlContent>) {
        content.push(self);
    }
}

impl ToHtmlContent for HtmlElement {
    fn add_to(self, content: &mut Vec<HtmlContent>) {
        content.push(HtmlContent::Html(self));
    }
}

impl ToHtmlContent for String {
    fn add_to(self, content: &mut Vec<HtmlContent>) {
        content.push(self.into());
    }
}

impl ToHtmlContent for &str {
    fn add_to(self, content: &mut Vec<HtmlContent>) {
        content.push(self.into());
    }
}

impl<T: Into<HtmlContent>> ToHtmlContent for Vec<T> {
    fn add_to(self, content: &mut Vec<HtmlContent>) {
        content.extend(self.into_iter().map(Into::into));
    }
}

impl<T: Into<HtmlContent>> ToHtmlContent for Option<T> {
    fn add_to(self, content: &mut Vec<HtmlContent>) {
        content.extend(self.map(Into::into));
    }
}

/// Text is escaped when displayed, `Raw` is written as is and is only used for
/// markup built by this crate (stylesheets, formatted numbers).
#[derive(Debug, Hash, Clone)]
pub enum HtmlContent {
    Text(String),
    Raw(String),
    Html(HtmlElement),
}

impl From<String> for HtmlContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for HtmlContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<HtmlElement> for HtmlContent {
    fn from(value: HtmlElement) -> Self {
        Self::Html(value)
    }
}

impl Display for HtmlContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(t) => write!(f, "{}", escape_text(t)),
            Self::Raw(t) => write!(f, "{t}"),
            Self::Html(t) => write!(f, "{t}"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum HtmlTag {
    /// Inline text semantics - The <a> HTML element (or anchor element), with its href attribute, creates a hyperlink to web pages, files, email addresses, locations in the same page, or anything else a URL can address.
    a,
    /// Sectioning root - The <body> HTML element represents the content of an HTML document. There can be only one <body> element in a document.
    body,
    /// Text content - The <div> HTML element is the generic container for flow content.
    div,
    /// Document metadata - The <head> HTML element contains machine-readable information (metadata) about the document, like its title, scripts, and style sheets.
    head,
    /// Main root - The <html> HTML element represents the root (top-level element) of an HTML document.
    html,
    /// Document metadata - The <meta> HTML element represents metadata that cannot be represented by other HTML meta-related elements.
    meta,
    /// Text content - The <p> HTML element represents a paragraph.
    p,
    /// Document metadata - The <style> HTML element contains style information for a document, or part of a document.
    style,
    /// Document metadata - The <title> HTML element defines the document's title that is shown in a browser's title bar or a page's tab.
    title,
}

impl HtmlTag {
    const fn is_void(self) -> bool {
        matches!(self, Self::meta)
    }
}

impl Display for HtmlTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested() {
        let element = HtmlElement::new(HtmlTag::div)
            .class("ion")
            .header("style", "color: #1f77b4;")
            .content("12.5")
            .content(HtmlElement::new(HtmlTag::p).content("2+"))
            .content(None::<String>);
        assert_eq!(
            element.to_string(),
            "<div class='ion' style='color: #1f77b4;'>12.5<p>2+</p></div>"
        );
    }

    #[test]
    fn escaped() {
        let element = HtmlElement::new(HtmlTag::a)
            .header("href", "http://localhost/?a=1&b='2'")
            .content("<M[Oxidation]> & more");
        assert_eq!(
            element.to_string(),
            "<a href='http://localhost/?a=1&amp;b=&#39;2&#39;'>&lt;M[Oxidation]&gt; &amp; more</a>"
        );
        assert_eq!(
            HtmlElement::new(HtmlTag::style)
                .content(HtmlContent::Raw("th > td {}".to_string()))
                .to_string(),
            "<style>th > td {}</style>"
        );
        assert_eq!(
            HtmlElement::new(HtmlTag::meta)
                .header("charset", "utf-8")
                .to_string(),
            "<meta charset='utf-8'>"
        );
    }
}
