use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;

use crate::config::{FinalSlideKind, Settings};

pub const WELCOME_SLIDE_ID: u32 = 1;
pub const FINAL_SLIDE_ID: u32 = 999;

/// Body shown on the text final slide when no custom text is configured.
pub const THANK_YOU_FALLBACK: &str = "Thank You!";

/// Seconds the welcome slide stays up before advancing on its own.
const WELCOME_SLIDE_SECS: u32 = 10;

const US_PLEDGE: &str = "I pledge allegiance to the Flag of the United States of America, \
    and to the Republic for which it stands, one Nation under God, indivisible, \
    with liberty and justice for all.";

const CLUB_PLEDGE: &str = "I pledge to be true to my club, to grow in skill and in \
    friendship, and to lend a hand at every meeting.";

/// Accent tint for a slide, resolved to a concrete color by the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Gold,
    White,
    Green,
    Red,
    Blue,
}

/// The wall-clock window during which a scheduled slide is the intended
/// active slide. A `None` end means the slide runs until the next scheduled
/// slide or the end of the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideWindow {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: Option<u32>,
    pub end_minute: Option<u32>,
}

impl SlideWindow {
    pub fn closed(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self {
            start_hour,
            start_minute,
            end_hour: Some(end_hour),
            end_minute: Some(end_minute),
        }
    }

    pub fn open(start_hour: u32, start_minute: u32) -> Self {
        Self {
            start_hour,
            start_minute,
            end_hour: None,
            end_minute: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub id: u32,
    pub title: String,
    pub body: Option<String>,
    pub image: Option<PathBuf>,
    pub window: Option<SlideWindow>,
    pub show_clock: bool,
    /// Seconds before an unscheduled slide advances on its own.
    pub duration: Option<u32>,
    pub footer: Option<String>,
    pub accent: Accent,
}

impl Slide {
    fn text(id: u32, title: &str, body: Option<&str>, accent: Accent) -> Self {
        Self {
            id,
            title: title.to_string(),
            body: body.map(str::to_string),
            image: None,
            window: None,
            show_clock: false,
            duration: None,
            footer: None,
            accent,
        }
    }

    fn game(id: u32, body: &str, accent: Accent, window: SlideWindow) -> Self {
        Self {
            id,
            title: String::new(),
            body: Some(body.to_string()),
            image: None,
            window: Some(window),
            show_clock: true,
            duration: None,
            footer: None,
            accent,
        }
    }
}

/// The ordered slide list for one slideshow session. Navigation is by index.
#[derive(Debug, Clone)]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    /// Validates the two deck invariants: ids are unique, and no two slides
    /// share a start minute (the schedule engine could otherwise fire either).
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut starts = HashSet::new();
        for slide in &slides {
            if !ids.insert(slide.id) {
                anyhow::bail!("duplicate slide id {}", slide.id);
            }
            if let Some(window) = &slide.window {
                if !starts.insert((window.start_hour, window.start_minute)) {
                    anyhow::bail!(
                        "two slides share the {:02}:{:02} start slot",
                        window.start_hour,
                        window.start_minute
                    );
                }
            }
        }
        Ok(Self { slides })
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn last_index(&self) -> usize {
        self.slides.len().saturating_sub(1)
    }
}

/// Assemble the deck for a session: fixed intro slides, the settings-derived
/// final slide, then the scheduled game slides. Rebuilt on every slideshow
/// entry since the final slide depends on the live settings.
pub fn build(settings: &Settings) -> Result<Deck> {
    let mut slides = vec![
        welcome_slide(),
        Slide::text(2, "Pledge of Allegiance", Some(US_PLEDGE), Accent::White),
        Slide::text(3, "Club Pledge", Some(CLUB_PLEDGE), Accent::White),
    ];
    slides.push(final_slide(settings));
    slides.extend(game_slides());
    Deck::new(slides)
}

fn welcome_slide() -> Slide {
    let mut slide = Slide::text(WELCOME_SLIDE_ID, "Welcome!", None, Accent::Gold);
    slide.duration = Some(WELCOME_SLIDE_SECS);
    slide
}

fn final_slide(settings: &Settings) -> Slide {
    let mut slide = Slide::text(FINAL_SLIDE_ID, "", None, Accent::White);
    match settings.final_slide {
        // black screen: no body, no image
        FinalSlideKind::Black => {}
        FinalSlideKind::Text => {
            let body = if settings.final_slide_content.is_empty() {
                THANK_YOU_FALLBACK.to_string()
            } else {
                settings.final_slide_content.clone()
            };
            slide.body = Some(body);
        }
        FinalSlideKind::Image => {
            if !settings.final_slide_content.is_empty() {
                slide.image = Some(PathBuf::from(&settings.final_slide_content));
            }
        }
    }
    slide
}

fn game_slides() -> Vec<Slide> {
    let mut closing = Slide::game(
        1004,
        "Explorer Games",
        Accent::Blue,
        SlideWindow::open(19, 15),
    );
    closing.footer = Some("End of club night \u{2014} please power off the display".to_string());

    vec![
        Slide::game(
            1001,
            "Senior Games",
            Accent::Green,
            SlideWindow::closed(18, 10, 18, 30),
        ),
        Slide::game(
            1002,
            "Junior Games",
            Accent::Red,
            SlideWindow::closed(18, 30, 19, 0),
        ),
        Slide::game(
            1003,
            "Explorer Games",
            Accent::Blue,
            SlideWindow::closed(19, 0, 19, 15),
        ),
        closing,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_order_and_ids() {
        let deck = build(&Settings::default()).expect("build");
        let ids: Vec<u32> = deck.slides().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 999, 1001, 1002, 1003, 1004]);
    }

    #[test]
    fn welcome_slide_auto_advances() {
        let deck = build(&Settings::default()).expect("build");
        assert_eq!(deck.slides()[0].duration, Some(10));
        assert!(deck.slides()[0].window.is_none());
    }

    #[test]
    fn final_slide_black_is_empty() {
        let deck = build(&Settings::default()).expect("build");
        let slide = &deck.slides()[3];
        assert_eq!(slide.id, FINAL_SLIDE_ID);
        assert!(slide.body.is_none());
        assert!(slide.image.is_none());
    }

    #[test]
    fn final_slide_text_falls_back_when_empty() {
        let settings = Settings {
            final_slide: FinalSlideKind::Text,
            final_slide_content: String::new(),
            ..Settings::default()
        };
        let deck = build(&settings).expect("build");
        assert_eq!(deck.slides()[3].body.as_deref(), Some(THANK_YOU_FALLBACK));
    }

    #[test]
    fn final_slide_text_keeps_content_verbatim() {
        let settings = Settings {
            final_slide: FinalSlideKind::Text,
            final_slide_content: "See you next week".to_string(),
            ..Settings::default()
        };
        let deck = build(&settings).expect("build");
        assert_eq!(deck.slides()[3].body.as_deref(), Some("See you next week"));
    }

    #[test]
    fn final_slide_image_carries_path() {
        let settings = Settings {
            final_slide: FinalSlideKind::Image,
            final_slide_content: "/tmp/closing.png".to_string(),
            ..Settings::default()
        };
        let deck = build(&settings).expect("build");
        let slide = &deck.slides()[3];
        assert_eq!(slide.image.as_deref(), Some(std::path::Path::new("/tmp/closing.png")));
        assert!(slide.body.is_none());
    }

    #[test]
    fn rebuild_changes_only_the_final_slide() {
        let before = build(&Settings::default()).expect("build");
        let after = build(&Settings {
            final_slide: FinalSlideKind::Text,
            final_slide_content: "Good night".to_string(),
            ..Settings::default()
        })
        .expect("build");
        assert_eq!(before.len(), after.len());
        for (a, b) in before.slides().iter().zip(after.slides()) {
            if a.id == FINAL_SLIDE_ID {
                assert_ne!(a.body, b.body);
            } else {
                assert_eq!(a.body, b.body);
                assert_eq!(a.window, b.window);
            }
        }
    }

    #[test]
    fn last_game_slide_is_open_ended_with_footer() {
        let deck = build(&Settings::default()).expect("build");
        let last = deck.slides().last().expect("last");
        assert_eq!(last.id, 1004);
        let window = last.window.expect("window");
        assert!(window.end_hour.is_none());
        assert!(last.footer.is_some());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let slides = vec![
            Slide::text(7, "a", None, Accent::White),
            Slide::text(7, "b", None, Accent::White),
        ];
        assert!(Deck::new(slides).is_err());
    }

    #[test]
    fn duplicate_start_minutes_are_rejected() {
        let slides = vec![
            Slide::game(1, "a", Accent::Green, SlideWindow::open(18, 10)),
            Slide::game(2, "b", Accent::Red, SlideWindow::closed(18, 10, 19, 0)),
        ];
        let err = Deck::new(slides).expect_err("clash");
        assert!(err.to_string().contains("18:10"));
    }
}
