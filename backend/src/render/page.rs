use crate::{
    html_builder::{HtmlContent, HtmlElement, HtmlTag},
    style::{StyledTable, TABLE_ID},
};

/// The links that let somebody else open the exact same table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShareLinks {
    pub url: String,
    /// The shortened url, or the error text if shortening failed
    pub short: Option<String>,
}

fn share_section(links: &ShareLinks) -> HtmlElement {
    HtmlElement::new(HtmlTag::div)
        .class("share")
        .content(
            HtmlElement::new(HtmlTag::p)
                .content("This page can be shared with others: ")
                .content(
                    HtmlElement::new(HtmlTag::a)
                        .header("href", links.url.as_str())
                        .content(links.url.as_str()),
                ),
        )
        .content(links.short.as_ref().map(|short| {
            HtmlElement::new(HtmlTag::p).content(format!("Shortened URL: {short}"))
        }))
}

/// A complete standalone html page with the table centred on it.
pub fn page(table: &StyledTable, title: &str, share: Option<&ShareLinks>) -> String {
    let html = HtmlElement::new(HtmlTag::html)
        .content(
            HtmlElement::new(HtmlTag::head)
                .content(HtmlElement::new(HtmlTag::meta).header("charset", "utf-8"))
                .content(HtmlElement::new(HtmlTag::title).content(format!("PepFrag - {title}")))
                .content(HtmlElement::new(HtmlTag::style).content(HtmlContent::Raw(format!(
                    "body {{ font-family: sans-serif; }}\n#{TABLE_ID} {{ margin-left: auto; margin-right: auto; }}\n{}",
                    table.css
                )))),
        )
        .content(
            HtmlElement::new(HtmlTag::body)
                .content(
                    HtmlElement::new(HtmlTag::div)
                        .class("title")
                        .content("PepFrag Results"),
                )
                .content(
                    HtmlElement::new(HtmlTag::div)
                        .id("table-container")
                        .header("style", "display: flex; justify-content: center;")
                        .content(HtmlContent::Raw(table.to_string())),
                )
                .content(share.map(share_section)),
        );
    format!("<!DOCTYPE html>\n{html}\n")
}
