use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

/// Palette and widget styling for the dark single-window shell. Applied once
/// at startup; render code only reads the named colors and frame helpers.
#[derive(Debug, Clone)]
pub struct Theme {
    pub panel: Color32,
    pub raised: Color32,
    pub hover: Color32,
    pub accent: Color32,
    pub accent_dim: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub text: Color32,
    pub text_dim: Color32,
    pub outline: Color32,
    pub pad: f32,
    pub corner: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            panel: Color32::from_rgb(0x13, 0x17, 0x1D),
            raised: Color32::from_rgb(0x1B, 0x21, 0x2A),
            hover: Color32::from_rgb(0x25, 0x2D, 0x38),
            accent: Color32::from_rgb(0x58, 0x9B, 0xF0),
            accent_dim: Color32::from_rgb(0x35, 0x6B, 0xC4),
            success: Color32::from_rgb(0x34, 0xC1, 0x7A),
            warning: Color32::from_rgb(0xE8, 0xA3, 0x2E),
            danger: Color32::from_rgb(0xE5, 0x53, 0x4B),
            text: Color32::from_rgb(0xE4, 0xEA, 0xF1),
            text_dim: Color32::from_rgb(0x87, 0x91, 0x9C),
            outline: Color32::from_rgba_premultiplied(255, 255, 255, 12),
            pad: 12.0,
            corner: 10,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.panel;
        visuals.window_fill = self.panel;
        visuals.window_stroke = Stroke::NONE;
        visuals.window_corner_radius = CornerRadius::same(self.corner);
        visuals.override_text_color = Some(self.text);
        visuals.selection.bg_fill = self.accent_dim;
        visuals.hyperlink_color = self.accent;
        for widget in [
            &mut visuals.widgets.noninteractive,
            &mut visuals.widgets.inactive,
        ] {
            widget.bg_fill = self.raised;
            widget.weak_bg_fill = self.raised;
            widget.bg_stroke = Stroke::NONE;
            widget.fg_stroke.color = self.text;
        }
        visuals.widgets.hovered.bg_fill = self.hover;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.fg_stroke.color = self.text;
        visuals.widgets.active.bg_fill = self.accent_dim;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.widgets.active.fg_stroke.color = self.text;

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(9.0, 9.0);
        style.spacing.button_padding = egui::vec2(12.0, 7.0);
        style
            .text_styles
            .insert(TextStyle::Heading, FontId::proportional(16.0));
        style
            .text_styles
            .insert(TextStyle::Body, FontId::proportional(14.0));
        style
            .text_styles
            .insert(TextStyle::Monospace, FontId::monospace(13.0));
        style
            .text_styles
            .insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.raised)
            .inner_margin(Margin::same(self.pad as i8))
            .corner_radius(CornerRadius::same(self.corner))
            .stroke(Stroke::new(1.0, self.outline))
    }

    pub fn composer_frame(&self) -> Frame {
        Frame::new()
            .fill(self.raised)
            .inner_margin(Margin::symmetric(self.pad as i8, 8))
            .corner_radius(CornerRadius::same(self.corner))
            .stroke(Stroke::NONE)
    }
}
