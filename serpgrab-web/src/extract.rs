//! HTML selection for results pages and article pages.
//!
//! Result titles come from two selector classes applied in a fixed order:
//! news titles first, then blog titles, each group in document order.
//! Article bodies come from the first known container present, tried in order.

use scraper::{ElementRef, Html, Selector};
use serpgrab_common::{ARTICLE_FALLBACK_TEXT, ResultItem};

use crate::{Result, WebError};

/// News result title anchors.
pub const NEWS_TITLE_SELECTOR: &str = ".news_tit";
/// Blog result title anchors.
pub const BLOG_TITLE_SELECTOR: &str = ".sh_blog_title";

const RESULT_SELECTORS: [&str; 2] = [NEWS_TITLE_SELECTOR, BLOG_TITLE_SELECTOR];

/// Article body containers, most specific first.
pub const ARTICLE_CONTAINERS: [&str; 3] =
    ["div#articleBodyContents", "div.news_end", "div.content"];

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| WebError::Parse(format!("selector `{css}`: {e}")))
}

/// Collect (title, href) pairs from one results page.
///
/// A matched node without `href` aborts extraction with
/// [`WebError::MissingAttribute`]; nodes are never skipped.
///
/// ```
/// use serpgrab_web::extract::extract_results;
///
/// let html = r#"<a class="sh_blog_title" href="https://b/1">blog</a>
///               <a class="news_tit" href="https://n/1">news</a>"#;
/// let items = extract_results(html).unwrap();
/// assert_eq!(items[0].title, "news");
/// assert_eq!(items[1].title, "blog");
/// ```
pub fn extract_results(markup: &str) -> Result<Vec<ResultItem>> {
    let doc = Html::parse_document(markup);
    let mut items = Vec::new();

    for css in RESULT_SELECTORS {
        let sel = selector(css)?;
        for (index, node) in doc.select(&sel).enumerate() {
            let link = node
                .value()
                .attr("href")
                .ok_or(WebError::MissingAttribute {
                    selector: css,
                    index,
                })?;
            items.push(ResultItem::new(node.text().collect::<String>(), link));
        }
    }

    Ok(items)
}

/// Body text of an article page, or [`ARTICLE_FALLBACK_TEXT`] when no known
/// container is present.
///
/// Text nodes of the container are joined with `\n` and the result is trimmed.
pub fn extract_article(markup: &str) -> String {
    let doc = Html::parse_document(markup);

    ARTICLE_CONTAINERS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|sel| doc.select(&sel).next().map(container_text))
        .unwrap_or_else(|| ARTICLE_FALLBACK_TEXT.to_string())
}

fn container_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[ResultItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn news_precede_blogs_regardless_of_document_position() {
        let html = r#"
            <ul>
              <li><a class="sh_blog_title" href="https://blog.example.com/1">blog one</a></li>
              <li><a class="news_tit" href="https://news.example.com/1">news one</a></li>
              <li><a class="sh_blog_title" href="https://blog.example.com/2">blog two</a></li>
              <li><a class="news_tit" href="https://news.example.com/2">news two</a></li>
              <li><a class="news_tit" href="https://news.example.com/3">news three</a></li>
            </ul>
        "#;
        let items = extract_results(html).unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(
            titles(&items),
            vec!["news one", "news two", "news three", "blog one", "blog two"]
        );
        assert_eq!(items[3].link, "https://blog.example.com/1");
    }

    #[test]
    fn title_is_concatenated_descendant_text() {
        let html = r#"<a class="news_tit" href="https://n/1">Rust <mark>1.80</mark> released</a>"#;
        let items = extract_results(html).unwrap();
        assert_eq!(items[0].title, "Rust 1.80 released");
    }

    #[test]
    fn href_entities_are_decoded() {
        let html = r#"<a class="news_tit" href="https://n/read?a=1&amp;b=2">t</a>"#;
        let items = extract_results(html).unwrap();
        assert_eq!(items[0].link, "https://n/read?a=1&b=2");
    }

    #[test]
    fn missing_href_is_fatal() {
        let html = r#"
            <a class="news_tit" href="https://n/1">ok</a>
            <a class="news_tit">no link</a>
        "#;
        let err = extract_results(html).unwrap_err();
        match err {
            WebError::MissingAttribute { selector, index } => {
                assert_eq!(selector, NEWS_TITLE_SELECTOR);
                assert_eq!(index, 1);
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn page_without_titles_yields_nothing() {
        let items = extract_results("<html><body><p>검색결과가 없습니다</p></body></html>").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn article_prefers_id_container_over_classes() {
        let html = r#"
            <div class="content">generic</div>
            <div class="news_end">end</div>
            <div id="articleBodyContents">  primary body  </div>
        "#;
        assert_eq!(extract_article(html), "primary body");
    }

    #[test]
    fn article_falls_through_to_news_end_then_content() {
        let news_end = r#"<div class="content">generic</div><div class="news_end">end body</div>"#;
        assert_eq!(extract_article(news_end), "end body");

        let content = r#"<div class="wrapper content">generic body</div>"#;
        assert_eq!(extract_article(content), "generic body");
    }

    #[test]
    fn article_joins_text_nodes_with_newlines() {
        let html = r#"<div id="articleBodyContents"><p>first</p><p>second</p></div>"#;
        assert_eq!(extract_article(html), "first\nsecond");
    }

    #[test]
    fn article_container_must_be_a_div() {
        let html = r#"<section id="articleBodyContents">not a div</section>"#;
        assert_eq!(extract_article(html), ARTICLE_FALLBACK_TEXT);
    }

    #[test]
    fn empty_container_is_not_a_miss() {
        let html = r#"<div class="news_end">   </div>"#;
        assert_eq!(extract_article(html), "");
    }

    #[test]
    fn no_container_returns_fallback() {
        assert_eq!(extract_article("<p>just a paragraph</p>"), ARTICLE_FALLBACK_TEXT);
        assert_eq!(extract_article(""), ARTICLE_FALLBACK_TEXT);
    }
}
