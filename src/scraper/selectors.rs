use serde::{Deserialize, Serialize};

/// Selectors that locate carousel parts in one DOM variant.
///
/// Every list is tried in order; the first selector that matches wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselSelectors {
    /// Slide indicator dots, one per slide
    pub dots: Vec<String>,
    /// The "next slide" control
    pub next: Vec<String>,
    /// Items of the slide list container
    pub list_items: Vec<String>,
}

impl Default for CarouselSelectors {
    fn default() -> Self {
        Self::post_page()
    }
}

impl CarouselSelectors {
    pub fn post_page() -> Self {
        Self {
            dots: strings(&[
                "article div._acnb",
                "div[role=\"presentation\"] div._acnb",
            ]),
            next: strings(&[
                "article button[aria-label=\"Next\"]",
                "button._afxw",
                "div[role=\"presentation\"] button[aria-label=\"Next\"]",
            ]),
            list_items: strings(&["article ul._acay > li", "div[role=\"presentation\"] ul > li"]),
        }
    }

    pub fn embed() -> Self {
        Self {
            dots: strings(&[".EmbedSidecar .SidecarDots > span", ".Sidecar .SlideIndicator"]),
            next: strings(&[
                "button[aria-label=\"Next\"]",
                ".EmbedSidecar button.Next",
                ".coreSpriteRightChevron",
            ]),
            list_items: strings(&[".EmbedSidecar li", "ul.Sidecar > li"]),
        }
    }
}

/// Named selector lists for every page variant the scraper touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub embed: CarouselSelectors,
    pub post: CarouselSelectors,

    /// Cookie banners and dismissable dialogs, clicked if visible
    pub interstitials: Vec<String>,

    /// Markers of a login wall that hides the post
    pub login_wall: Vec<String>,

    pub embed_author: Vec<String>,
    pub embed_caption: Vec<String>,

    /// `<meta>` tags whose `content` holds the "X on Instagram" title
    pub meta_title: Vec<String>,

    /// `<meta>` tags whose `content` holds the "N likes, M comments" description
    pub meta_description: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            embed: CarouselSelectors::embed(),
            post: CarouselSelectors::post_page(),
            interstitials: strings(&[
                "button._a9--._a9_1",
                "div[role=\"dialog\"] button[aria-label=\"Close\"]",
                "div[role=\"dialog\"] div[role=\"button\"][aria-label=\"Close\"]",
            ]),
            login_wall: strings(&[
                "form#loginForm",
                "div[role=\"dialog\"] input[name=\"username\"]",
            ]),
            embed_author: strings(&[".UsernameText", ".CaptionUsername", "a.Username"]),
            embed_caption: strings(&[".Caption", ".CaptionText"]),
            meta_title: strings(&["meta[property=\"og:title\"]", "meta[name=\"twitter:title\"]"]),
            meta_description: strings(&[
                "meta[property=\"og:description\"]",
                "meta[name=\"description\"]",
            ]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_populated() {
        let selectors = SelectorConfig::default();
        assert!(!selectors.embed.next.is_empty());
        assert!(!selectors.post.dots.is_empty());
        assert!(!selectors.meta_title.is_empty());
        assert_ne!(selectors.embed, selectors.post);
    }

    #[test]
    fn test_partial_override_keeps_other_lists() {
        let selectors: SelectorConfig = toml::from_str(
            r#"
[post]
next = ["button.custom-next"]
"#,
        )
        .unwrap();
        assert_eq!(selectors.post.next, vec!["button.custom-next"]);
        // Unspecified lists within the section fall back to post-page defaults
        assert_eq!(selectors.post.dots, CarouselSelectors::post_page().dots);
        assert_eq!(selectors.embed, CarouselSelectors::embed());
    }
}
