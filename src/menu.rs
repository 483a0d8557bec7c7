use std::time::{Duration, Instant};

use crate::game::ModeKind;
use crate::pose::BODY_PARTS;
use crate::render::{
    COUNTDOWN_COLOR, Canvas, MENU_ACTIVE_COLOR, MENU_IDLE_COLOR, text,
};
use crate::types::Person;

/// Re-click debounce; without it a hovering hand toggles every tick.
const CLICK_INTERVAL: Duration = Duration::from_secs(2);
const COUNTDOWN_START: u32 = 5;
const BUTTON_THICKNESS: i32 = 2;
const CAPTION_SCALE: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCount {
    One,
    Two,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSetup {
    pub players: PlayerCount,
    pub mode: ModeKind,
}

/// What the menu decided this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    Idle,
    Quit,
    Launch(GameSetup),
}

struct Button {
    top_left: (i32, i32),
    bottom_right: (i32, i32),
    caption: &'static str,
    clicked: bool,
    /// `None` until the first click; a fresh button debounces nothing.
    last_click: Option<Instant>,
}

impl Button {
    fn new(top_left: (i32, i32), bottom_right: (i32, i32), caption: &'static str) -> Self {
        Button {
            top_left,
            bottom_right,
            caption,
            clicked: false,
            last_click: None,
        }
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        let (x, y) = (x as i32, y as i32);
        x >= self.top_left.0
            && x <= self.bottom_right.0
            && y >= self.top_left.1
            && y <= self.bottom_right.1
    }

    fn click(&mut self) {
        let now = Instant::now();
        let ready = self
            .last_click
            .is_none_or(|last| now.duration_since(last) >= CLICK_INTERVAL);
        if ready {
            self.clicked = !self.clicked;
            self.last_click = Some(now);
        }
    }

    fn reset(&mut self) {
        self.clicked = false;
        self.last_click = None;
    }

    fn draw(&self, canvas: &mut Canvas) {
        let color = if self.clicked {
            MENU_ACTIVE_COLOR
        } else {
            MENU_IDLE_COLOR
        };
        canvas.draw_rect(self.top_left, self.bottom_right, color, BUTTON_THICKNESS);

        let caption_w = text::text_width(self.caption, CAPTION_SCALE) as i32;
        let caption_h = (text::GLYPH_HEIGHT * CAPTION_SCALE) as i32;
        let cx = (self.top_left.0 + self.bottom_right.0) / 2 - caption_w / 2;
        let cy = (self.top_left.1 + self.bottom_right.1) / 2 - caption_h / 2;
        text::draw_text(canvas, cx, cy, self.caption, CAPTION_SCALE, color);
    }
}

/// Full-screen menu the player operates by holding a hand or foot over a
/// button. Produces a [`GameSetup`] after Start plus a short countdown, or a
/// quit signal.
pub struct Menu {
    width: u32,
    height: u32,
    threshold: f32,
    one_player: Button,
    two_player: Button,
    classic: Button,
    intensive: Button,
    start: Button,
    quit: Button,
    /// Remaining seconds and the moment of the last decrement.
    countdown: Option<(u32, Instant)>,
}

impl Menu {
    pub fn new(width: u32, height: u32, threshold: f32) -> Self {
        let margin_left = (width as f32 * 0.05) as i32;
        let margin_top = (height as f32 * 0.05) as i32;
        let item_w = (width as f32 * 0.23) as i32;
        let item_h = (width as f32 * 0.14) as i32;
        let w = width as i32;
        let h = height as i32;

        let left_item = |row: i32| {
            (
                (margin_left, margin_top * (row + 1) + item_h * row),
                (
                    margin_left + item_w,
                    margin_top * (row + 1) + item_h * (row + 1),
                ),
            )
        };

        let (one_tl, one_br) = left_item(0);
        let (two_tl, two_br) = left_item(1);
        let (classic_tl, classic_br) = left_item(2);
        let (intensive_tl, intensive_br) = left_item(3);

        Menu {
            width,
            height,
            threshold,
            one_player: Button::new(one_tl, one_br, "1 PLAYER"),
            two_player: Button::new(two_tl, two_br, "2 PLAYERS"),
            classic: Button::new(classic_tl, classic_br, "CLASSIC"),
            intensive: Button::new(intensive_tl, intensive_br, "INTENSIVE"),
            start: Button::new(
                (w - margin_left - item_w, margin_top),
                (w - margin_left, margin_top + item_h),
                "START",
            ),
            quit: Button::new(
                (w - margin_left - item_w, h - margin_top - item_h),
                (w - margin_left, h - margin_top),
                "QUIT",
            ),
            countdown: None,
        }
    }

    /// One menu tick: track joints over buttons, run the countdown, draw.
    pub fn process(&mut self, canvas: &mut Canvas, persons: &[Person]) -> MenuEvent {
        if let Some((remaining, last)) = self.countdown {
            if remaining == 0 {
                self.countdown = None;
                if let Some(setup) = self.selection() {
                    return MenuEvent::Launch(setup);
                }
                return MenuEvent::Idle;
            }
            let now = Instant::now();
            if now.duration_since(last) >= Duration::from_secs(1) {
                self.countdown = Some((remaining - 1, now));
            }
            self.draw_countdown(canvas, remaining);
            return MenuEvent::Idle;
        }

        self.update_buttons(persons);

        if self.quit.clicked {
            return MenuEvent::Quit;
        }
        if self.start.clicked && self.selection().is_some() {
            self.countdown = Some((COUNTDOWN_START, Instant::now()));
        }

        self.draw(canvas);
        MenuEvent::Idle
    }

    /// Back to a blank menu, e.g. after a round ends.
    pub fn reset(&mut self) {
        for button in [
            &mut self.one_player,
            &mut self.two_player,
            &mut self.classic,
            &mut self.intensive,
            &mut self.start,
            &mut self.quit,
        ] {
            button.reset();
        }
        self.countdown = None;
    }

    fn selection(&self) -> Option<GameSetup> {
        let players = if self.one_player.clicked {
            PlayerCount::One
        } else if self.two_player.clicked {
            PlayerCount::Two
        } else {
            return None;
        };
        let mode = if self.classic.clicked {
            ModeKind::Classic
        } else if self.intensive.clicked {
            ModeKind::IntensiveAim
        } else {
            return None;
        };
        Some(GameSetup { players, mode })
    }

    fn update_buttons(&mut self, persons: &[Person]) {
        let (w, h, threshold) = (self.width, self.height, self.threshold);
        let mut touched = [false; 6];

        for person in persons {
            for part in BODY_PARTS {
                for &idx in part.indexes {
                    let Some((x, y)) = person
                        .get(idx)
                        .and_then(|j| j.to_pixel(w, h, threshold))
                    else {
                        continue;
                    };
                    let buttons = [
                        &self.one_player,
                        &self.two_player,
                        &self.classic,
                        &self.intensive,
                        &self.start,
                        &self.quit,
                    ];
                    for (slot, button) in touched.iter_mut().zip(buttons) {
                        if button.contains(x, y) {
                            *slot = true;
                        }
                    }
                }
            }
        }

        let selection_complete = self.selection().is_some();
        let [one, two, classic, intensive, start, quit] = touched;
        if one {
            self.one_player.click();
            if self.one_player.clicked {
                self.two_player.clicked = false;
            }
        }
        if two {
            self.two_player.click();
            if self.two_player.clicked {
                self.one_player.clicked = false;
            }
        }
        if classic {
            self.classic.click();
            if self.classic.clicked {
                self.intensive.clicked = false;
            }
        }
        if intensive {
            self.intensive.click();
            if self.intensive.clicked {
                self.classic.clicked = false;
            }
        }
        // Start is inert until both choices are made.
        if start && selection_complete {
            self.start.click();
        }
        if quit {
            self.quit.click();
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        for button in [
            &self.one_player,
            &self.two_player,
            &self.classic,
            &self.intensive,
            &self.start,
            &self.quit,
        ] {
            button.draw(canvas);
        }
    }

    fn draw_countdown(&self, canvas: &mut Canvas, remaining: u32) {
        let label = remaining.to_string();
        let scale = 8;
        let x = self.width as i32 / 2 - text::text_width(&label, scale) as i32 / 2;
        let y = self.height as i32 / 2 - (text::GLYPH_HEIGHT * scale) as i32 / 2;
        text::draw_text(canvas, x, y, &label, scale, COUNTDOWN_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, NUM_LANDMARKS};
    use crate::types::{Frame, Joint};

    const W: u32 = 640;
    const H: u32 = 480;

    fn frame() -> Frame {
        Frame {
            rgba: vec![0u8; (W * H * 4) as usize],
            width: W,
            height: H,
            timestamp: Instant::now(),
        }
    }

    /// Person whose left hand hovers at the given pixel.
    fn hand_at(px: f32, py: f32) -> Person {
        let mut person = vec![Joint::new(-1.0, -1.0, 0.0); NUM_LANDMARKS];
        person[Landmark::LeftWrist as usize] =
            Joint::new(px / W as f32, py / H as f32, 1.0);
        person
    }

    fn button_center(button: &Button) -> (f32, f32) {
        (
            (button.top_left.0 + button.bottom_right.0) as f32 / 2.0,
            (button.top_left.1 + button.bottom_right.1) as f32 / 2.0,
        )
    }

    #[test]
    fn hovering_clicks_a_button_once() {
        let mut menu = Menu::new(W, H, 0.2);
        let (x, y) = button_center(&menu.one_player);
        let person = hand_at(x, y);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        assert_eq!(menu.process(&mut canvas, &[person.clone()]), MenuEvent::Idle);
        assert!(menu.one_player.clicked);

        // Holding the hand there does not un-click within the debounce window.
        let mut canvas = Canvas::new(&mut f);
        let _ = menu.process(&mut canvas, &[person]);
        assert!(menu.one_player.clicked);
    }

    #[test]
    fn fresh_button_is_immediately_clickable() {
        let mut button = Button::new((0, 0), (10, 10), "QUIT");
        assert!(button.last_click.is_none());
        button.click();
        assert!(button.clicked);
        // A second click inside the debounce window changes nothing.
        button.click();
        assert!(button.clicked);
        button.reset();
        assert!(button.last_click.is_none());
    }

    #[test]
    fn player_count_buttons_are_mutually_exclusive() {
        let mut menu = Menu::new(W, H, 0.2);
        menu.one_player.clicked = true;
        let (x, y) = button_center(&menu.two_player);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        let _ = menu.process(&mut canvas, &[hand_at(x, y)]);
        assert!(menu.two_player.clicked);
        assert!(!menu.one_player.clicked);
    }

    #[test]
    fn start_is_inert_without_a_full_selection() {
        let mut menu = Menu::new(W, H, 0.2);
        menu.one_player.clicked = true; // mode still missing
        let (x, y) = button_center(&menu.start);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        let _ = menu.process(&mut canvas, &[hand_at(x, y)]);
        assert!(!menu.start.clicked);
        assert!(menu.countdown.is_none());
    }

    #[test]
    fn start_launches_after_countdown() {
        let mut menu = Menu::new(W, H, 0.2);
        menu.one_player.clicked = true;
        menu.classic.clicked = true;
        menu.countdown = Some((0, Instant::now()));

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        let event = menu.process(&mut canvas, &[]);
        assert_eq!(
            event,
            MenuEvent::Launch(GameSetup {
                players: PlayerCount::One,
                mode: ModeKind::Classic,
            })
        );
    }

    #[test]
    fn quit_click_reports_quit() {
        let mut menu = Menu::new(W, H, 0.2);
        let (x, y) = button_center(&menu.quit);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        let event = menu.process(&mut canvas, &[hand_at(x, y)]);
        assert_eq!(event, MenuEvent::Quit);
    }

    #[test]
    fn reset_clears_all_state() {
        let mut menu = Menu::new(W, H, 0.2);
        menu.one_player.clicked = true;
        menu.classic.clicked = true;
        menu.countdown = Some((3, Instant::now()));
        menu.reset();
        assert!(!menu.one_player.clicked);
        assert!(menu.countdown.is_none());
        assert!(menu.selection().is_none());
    }
}
