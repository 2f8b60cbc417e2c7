//! Instruction text sent to the hosted model

use crate::widget::AspectRatio;

const DESIGN_BRIEF: &str = "\
DESIGN DIRECTION - minimal monochrome:
- Minimalism: clean, uncluttered layouts; generous negative space; every element earns its place
- Clarity: translucent surfaces, hairline borders, an obvious visual hierarchy
- Dot-matrix accents: grid-based layouts, pixel or geometric patterns used sparingly
- Typography: bold, legible type with clear hierarchy; monospace or modern sans-serif
- Palette: black, white and greys; colour only where it carries meaning
- Depth through transparency: rgba() colours, backdrop filters, subtle opacity
- Structure: CSS Grid with clean geometric divisions";

/// Build the full instruction for `prompt` at the canvas size of `aspect_ratio`.
pub fn build_instruction(prompt: &str, aspect_ratio: AspectRatio) -> String {
    let size = aspect_ratio.reference_size();
    let (width, height) = (size.width, size.height);
    let vw_per_px = 100.0 / f64::from(width);
    let vh_per_px = 100.0 / f64::from(height);

    format!(
        "You are an expert HTML/CSS/JavaScript developer. Generate a complete, self-contained HTML page that will be embedded in an iframe.

SIZE RULES - MANDATORY:
- Use VIEWPORT UNITS (vw, vh) for ALL sizing; the iframe scales to fit its container
- Reference dimensions: {width}x{height} pixels (this is what 100vw x 100vh represents)
- html, body and every root container: width: 100vw !important; height: 100vh !important; max-width: 100vw !important; max-height: 100vh !important;
- Widths, heights, margins, padding and positions use vw/vh, never fixed px
- Font sizes use vw as well (for example font-size: 4vw)
- overflow: hidden !important; on html, body and all containers
- box-sizing: border-box !important; on ALL elements
- Nothing may exceed 100vw x 100vh: no scrolling, no overflow, nothing outside the boundary
- Structure: html and body are 100vw x 100vh, then a container div with width: 100%; height: 100%; holds the layout
- Pixel conversion: 1px = {vw_per_px:.4}vw for horizontal measurements, 1px = {vh_per_px:.4}vh for vertical ones
- Images and media: max-width: 100vw; max-height: 100vh; sized to fit

{DESIGN_BRIEF}

TECHNICAL RULES:
- Inline CSS only (no external stylesheets)
- Inline JavaScript only (no external scripts)
- Production-ready, complete markup
- The design must match the {aspect_ratio} aspect ratio exactly
- All content stays within the {width}x{height} pixel boundary

User's request: {prompt}

Return ONLY the HTML as a single document. No markdown code fences, no explanations, just raw HTML that fits {width}x{height} pixels and follows the minimal monochrome direction above."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_reference_dimensions() {
        let text = build_instruction("a clock", AspectRatio::Wide);
        assert!(text.contains("Reference dimensions: 800x400 pixels"));
        assert!(text.contains("1px = 0.1250vw"));
        assert!(text.contains("1px = 0.2500vh"));
        assert!(text.contains("2x1 aspect ratio"));
    }

    #[test]
    fn embeds_user_request_and_brief() {
        let text = build_instruction("a pomodoro timer", AspectRatio::Square);
        assert!(text.contains("User's request: a pomodoro timer"));
        assert!(text.contains("DESIGN DIRECTION"));
        assert!(text.contains("overflow: hidden"));
    }
}
