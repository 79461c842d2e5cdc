use scraper::{ElementRef, Html, Selector};

/// Elements whose text never reaches the reader.
const HIDDEN_TEXT_PARENTS: &[&str] = &["script", "style", "template"];

/// Block-level containers scanned by the fallback strategy.
const CONTAINER_SELECTOR: &str = "div, section, article";

/// A results page parsed once and shared by every strategy.
pub struct ParsedPage {
    document: Html,
}

impl ParsedPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Whole-document text: every visible text node, concatenated as-is so the
    /// source line breaks survive.
    pub fn text(&self) -> String {
        visible_text(self.document.root_element()).concat()
    }

    /// Flattened text of each `div`/`section`/`article`, in document order.
    ///
    /// Text nodes are trimmed, empties dropped, and the rest joined with `\n`,
    /// so each text node becomes one line.
    pub fn container_texts(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse(CONTAINER_SELECTOR) else {
            return Vec::new();
        };

        self.document
            .select(&selector)
            .map(|element| {
                visible_text(element)
                    .into_iter()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect()
    }
}

fn visible_text(element: ElementRef<'_>) -> Vec<&str> {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TEXT_PARENTS.contains(&e.name()))
            });
            (!hidden).then_some(&**text)
        })
        .collect()
}
