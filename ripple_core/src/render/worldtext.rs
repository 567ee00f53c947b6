//! Worldtext - the styled narrative text view.

use world_rules::Vector;

use super::{Frame, Renderer};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

/// Width of the energy bar in cells.
const BAR_WIDTH: usize = 10;

fn vector_color(vector: Vector) -> &'static str {
    match vector {
        Vector::Goal => "\x1b[32m",
        Vector::Obstacle => "\x1b[31m",
        Vector::Shift => "\x1b[35m",
    }
}

/// Renders the frame as wrapped, optionally ANSI-styled text.
#[derive(Debug, Clone)]
pub struct WorldtextRenderer {
    styled: bool,
    width: usize,
}

impl WorldtextRenderer {
    pub fn new(styled: bool, width: usize) -> Self {
        Self {
            styled,
            width: width.max(20),
        }
    }

    /// Unstyled text, 72 columns.
    pub fn plain() -> Self {
        Self::new(false, 72)
    }

    fn style(&self, code: &str, text: &str) -> String {
        if self.styled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for WorldtextRenderer {
    fn default() -> Self {
        Self::new(true, 72)
    }
}

impl Renderer for WorldtextRenderer {
    fn name(&self) -> &'static str {
        "worldtext"
    }

    fn render(&self, frame: &Frame<'_>) -> String {
        let scenario = frame.scenario;
        let mut out = String::new();

        out.push_str(&self.style(BOLD, &scenario.name));
        out.push_str(&format!("  [{} | tick {}]\n", scenario.physics, frame.tick));
        for line in wrap(&scenario.baseline, self.width) {
            out.push_str(&self.style(DIM, &line));
            out.push('\n');
        }
        out.push('\n');

        for entity in &scenario.entities {
            let marker = if frame.is_selected(&entity.id) {
                '>'
            } else if frame.is_echo_target(&entity.id) {
                '~'
            } else {
                ' '
            };
            out.push_str(&format!(
                "{marker} {:<18} {} {:>3} {}\n",
                entity.name,
                energy_bar(entity.energy),
                entity.energy,
                entity.state
            ));
        }

        if let Some(ripple) = frame.last_ripple {
            out.push('\n');
            let label = format!("{}", ripple.vector);
            out.push_str(&self.style(vector_color(ripple.vector), &label));
            out.push('\n');
            for line in wrap(&ripple.text, self.width) {
                out.push_str(&self.style(ITALIC, &line));
                out.push('\n');
            }
            if ripple.did_propagate() {
                let targets: Vec<_> = ripple.echo_targets().map(|id| id.as_str()).collect();
                out.push_str(&self.style(DIM, &format!("echoes: {}", targets.join(", "))));
                out.push('\n');
            }
        }

        out
    }
}

fn energy_bar(energy: u8) -> String {
    let filled = (usize::from(energy) * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
