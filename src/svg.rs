//! Compaction of SVG produced by the painters before it is stored or
//! embedded elsewhere.

use log::{debug, trace};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map},
    sequence::{delimited, pair, separated_pair, tuple},
    IResult,
};
use roxmltree::{Attribute, Document, Namespace, Node, NodeType};
use xmlwriter::{Indent, Options, XmlWriter};

use crate::error::Result;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Strips painter bookkeeping (classes, pad and object ids, empty titles),
/// empty groups and empty frame `<svg>` elements, and unquotes `url("#id")`
/// references.
pub fn compress_svg(svg: &str) -> Result<String> {
    let doc = Document::parse(svg)?;
    let keep_xlink = doc.descendants().any(|n| {
        n.attributes()
            .any(|a| a.namespace() == Some(XLINK_NS) && a.name() == "href")
    });

    let mut writer = XmlWriter::new(Options {
        indent: Indent::None,
        ..Options::default()
    });
    walk(doc.root_element(), &mut writer, keep_xlink);
    let out = writer.end_document();
    debug!("compressed svg from {} to {} bytes", svg.len(), out.len());
    Ok(out)
}

fn walk(node: Node, w: &mut XmlWriter, keep_xlink: bool) {
    match node.node_type() {
        NodeType::Element => {
            if is_redundant(node) {
                trace!("dropping empty <{}>", node.tag_name().name());
                return;
            }

            let tag = node.tag_name();
            w.start_element(&qualified_name(node, tag.namespace(), tag.name()));
            for attr in node.attributes().filter(|a| keeps_attribute(node, a)) {
                let k = qualified_name(node, attr.namespace(), attr.name());
                w.write_attribute(&k, &unquote_urls(attr.value()));
            }

            for ns in declared_namespaces(node) {
                if ns.uri() == XML_NS || (ns.uri() == XLINK_NS && !keep_xlink) {
                    continue;
                }
                match ns.name() {
                    Some(prefix) => w.write_attribute(&format!("xmlns:{}", prefix), ns.uri()),
                    None => w.write_attribute("xmlns", ns.uri()),
                }
            }

            for c in node.children() {
                walk(c, w, keep_xlink);
            }
            w.end_element();
        }
        NodeType::Text => {
            w.write_text(node.text().unwrap_or(""));
        }
        NodeType::Comment => {
            w.write_comment(node.text().unwrap_or(""));
        }
        _ => {}
    }
}

// in-scope namespaces minus the ones inherited unchanged from the parent
fn declared_namespaces<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = &'a Namespace<'input>> {
    let parent = node.parent_element();
    node.namespaces().filter(move |ns| {
        !parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        })
    })
}

fn qualified_name(node: Node, ns_uri: Option<&str>, local_name: &str) -> String {
    match ns_uri.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local_name),
        _ => local_name.to_string(),
    }
}

fn keeps_attribute(node: Node, attr: &Attribute) -> bool {
    if attr.namespace().is_some() {
        return true;
    }
    match attr.name() {
        "class" | "pad" => false,
        "title" => !attr.value().is_empty(),
        "objname" | "objtype" => node.tag_name().name() != "g",
        _ => true,
    }
}

/// Elements that draw nothing: groups without content and without
/// attributes beyond an integer translation, and empty clipping frames.
fn is_redundant(node: Node) -> bool {
    if node.parent_element().is_none() {
        return false;
    }
    let empty = node.children().all(|c| match c.node_type() {
        NodeType::Element => is_redundant(c),
        NodeType::Text => c.text().map_or(true, |t| t.trim().is_empty()),
        NodeType::Comment => false,
        _ => true,
    });
    if !empty {
        return false;
    }

    match node.tag_name().name() {
        "g" => node
            .attributes()
            .filter(|a| keeps_attribute(node, a))
            .all(|a| a.name() == "transform" && is_integer_translate(a.value())),
        "svg" => {
            node.attribute("x") == Some("0")
                && node.attribute("y") == Some("0")
                && node.attribute("overflow") == Some("hidden")
                && node.attributes().all(|a| {
                    matches!(a.name(), "x" | "y" | "overflow" | "width" | "height" | "viewBox")
                })
        }
        _ => false,
    }
}

fn sep(input: &str) -> IResult<&str, ()> {
    let comma = map(tuple((space0, char(','), space0)), |_| ());
    let spaces = map(space1, |_| ());
    alt((comma, spaces))(input)
}

fn integer_translate(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(delimited(
        pair(tag("translate("), space0),
        separated_pair(digit1, sep, digit1),
        pair(space0, char(')')),
    ))(input)
}

fn is_integer_translate(value: &str) -> bool {
    integer_translate(value.trim()).is_ok()
}

fn quoted_url(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("url(\"#"),
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        tag("\")"),
    )(input)
}

/// `url("#id")` becomes `url(#id)`.
fn unquote_urls(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find("url(") {
        out.push_str(&rest[..pos]);
        match quoted_url(&rest[pos..]) {
            Ok((tail, id)) => {
                out.push_str("url(#");
                out.push_str(id);
                out.push(')');
                rest = tail;
            }
            Err(_) => {
                out.push_str("url(");
                rest = &rest[pos + 4..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SVG_NS: &str = r#"xmlns="http://www.w3.org/2000/svg""#;
    const XLINK_DECL: &str = r#"xmlns:xlink="http://www.w3.org/1999/xlink""#;

    #[test]
    fn strips_painter_bookkeeping() -> anyhow::Result<()> {
        let input = format!(
            r#"<svg {SVG_NS} {XLINK_DECL} width="10"><g class="root_frame" objname="h1" objtype="TH1"><path d="M0,0h5" fill="url(&quot;#grad1&quot;)"/></g><g></g><g transform="translate(5,10)"><g/></g></svg>"#
        );
        let out = compress_svg(&input)?;
        assert_eq!(
            out,
            r#"<svg width="10" xmlns="http://www.w3.org/2000/svg"><g><path d="M0,0h5" fill="url(#grad1)"/></g></svg>"#
        );
        Ok(())
    }

    #[test]
    fn drops_empty_frames_and_titles() -> anyhow::Result<()> {
        let input = format!(
            r#"<svg {SVG_NS}><svg x="0" y="0" overflow="hidden" width="20" height="20" viewBox="0 0 20 20"></svg><text x="1" title="" pad="p1">ab</text></svg>"#
        );
        let out = compress_svg(&input)?;
        assert_eq!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="1">ab</text></svg>"#
        );
        Ok(())
    }

    #[test]
    fn keeps_groups_that_matter() -> anyhow::Result<()> {
        let input = format!(
            r#"<svg {SVG_NS}><g transform="translate(1.5,2)"/><g fill="red"/><g title="t"/></svg>"#
        );
        let out = compress_svg(&input)?;
        assert_eq!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="translate(1.5,2)"/><g fill="red"/><g title="t"/></svg>"#
        );
        Ok(())
    }

    #[test]
    fn frames_with_content_survive() -> anyhow::Result<()> {
        let input = format!(
            r#"<svg {SVG_NS}><svg x="0" y="0" overflow="hidden" width="20" height="20"><rect width="5" height="5"/></svg></svg>"#
        );
        let out = compress_svg(&input)?;
        assert!(out.contains(r#"<rect width="5" height="5"/>"#));
        assert!(out.contains(r#"overflow="hidden""#));
        Ok(())
    }

    #[test]
    fn xlink_kept_when_referenced() -> anyhow::Result<()> {
        let input = format!(r##"<svg {SVG_NS} {XLINK_DECL}><use xlink:href="#m1"/></svg>"##);
        let out = compress_svg(&input)?;
        assert!(out.contains(XLINK_DECL));
        assert!(out.contains(r##"<use xlink:href="#m1"/>"##));
        Ok(())
    }

    #[test]
    fn invalid_svg_is_an_error() {
        assert!(matches!(compress_svg("<svg><g></svg>"), Err(Error::Svg(_))));
    }

    #[test]
    fn translate_check() {
        assert!(is_integer_translate("translate(5,10)"));
        assert!(is_integer_translate("translate(5 10)"));
        assert!(!is_integer_translate("translate(5.5,10)"));
        assert!(!is_integer_translate("translate(-5,10)"));
        assert!(!is_integer_translate("scale(2,2)"));
    }

    #[test]
    fn url_unquoting() {
        assert_eq!(unquote_urls(r##"url("#clip1")"##), "url(#clip1)");
        assert_eq!(unquote_urls(r##"a url("#x_1") b url(#y)"##), "a url(#x_1) b url(#y)");
        assert_eq!(unquote_urls("url(\"#\")"), "url(\"#\")");
        assert_eq!(unquote_urls("none"), "none");
    }

    #[test]
    fn nested_namespace_declarations_survive() -> anyhow::Result<()> {
        let input = format!(
            r##"<svg {SVG_NS}><svg {XLINK_DECL}><use xlink:href="#a"/></svg><foreignObject><div xmlns="http://www.w3.org/1999/xhtml">x</div></foreignObject></svg>"##
        );
        let out = compress_svg(&input)?;
        assert!(out.contains(&format!("<svg {XLINK_DECL}>")));
        assert!(out.contains(r#"<div xmlns="http://www.w3.org/1999/xhtml">x</div>"#));

        let doc = Document::parse(&out)?;
        let use_node = doc
            .descendants()
            .find(|n| n.has_tag_name("use"))
            .expect("use element kept");
        assert_eq!(use_node.attribute((XLINK_NS, "href")), Some("#a"));
        let div = doc
            .descendants()
            .find(|n| n.tag_name().name() == "div")
            .expect("div element kept");
        assert_eq!(div.tag_name().namespace(), Some("http://www.w3.org/1999/xhtml"));
        Ok(())
    }

    #[test]
    fn comments_are_kept() -> anyhow::Result<()> {
        let input = format!(r#"<svg {SVG_NS}><g><!--frame--></g></svg>"#);
        let out = compress_svg(&input)?;
        assert_eq!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><!--frame--></g></svg>"#
        );
        Ok(())
    }
}
