//! Keyboard bindings.

use winit::keyboard::KeyCode;

/// Live edit of the running simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    SelectNext,
    SelectPrevious,
    ToggleTessellation,
    ToggleEclipse,
    SlowerTime,
    FasterTime,
    /// Change the target on-screen edge length by this many pixels.
    TargetPixelSize(f32),
    /// Re-apply the selected orbit with its period multiplied by this factor.
    ScalePeriod(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Edit(Edit),
    ReloadConfig,
    Quit,
}

/// Period factor of `O`; `Shift+O` applies the inverse.
pub const PERIOD_SCALE: f32 = 0.5;

/// Action bound to a key press, `None` for unbound keys.
///
/// `repeat` is set for auto-repeated presses, which only the continuous
/// adjustments honour.
pub fn key_action(code: KeyCode, shift: bool, repeat: bool) -> Option<KeyAction> {
    let action = match code {
        KeyCode::Tab if shift => KeyAction::Edit(Edit::SelectPrevious),
        KeyCode::Tab => KeyAction::Edit(Edit::SelectNext),
        KeyCode::KeyT => KeyAction::Edit(Edit::ToggleTessellation),
        KeyCode::KeyE => KeyAction::Edit(Edit::ToggleEclipse),
        KeyCode::BracketLeft => KeyAction::Edit(Edit::SlowerTime),
        KeyCode::BracketRight => KeyAction::Edit(Edit::FasterTime),
        KeyCode::ArrowUp => KeyAction::Edit(Edit::TargetPixelSize(1.0)),
        KeyCode::ArrowDown => KeyAction::Edit(Edit::TargetPixelSize(-1.0)),
        KeyCode::KeyO if shift => KeyAction::Edit(Edit::ScalePeriod(1.0 / PERIOD_SCALE)),
        KeyCode::KeyO => KeyAction::Edit(Edit::ScalePeriod(PERIOD_SCALE)),
        KeyCode::F5 => KeyAction::ReloadConfig,
        KeyCode::Escape => KeyAction::Quit,
        _ => return None,
    };

    let continuous = matches!(
        action,
        KeyAction::Edit(Edit::SlowerTime | Edit::FasterTime | Edit::TargetPixelSize(_))
    );
    (!repeat || continuous).then_some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_tab_selects_previous() {
        assert_eq!(
            key_action(KeyCode::Tab, true, false),
            Some(KeyAction::Edit(Edit::SelectPrevious))
        );
        assert_eq!(
            key_action(KeyCode::Tab, false, false),
            Some(KeyAction::Edit(Edit::SelectNext))
        );
    }

    #[test]
    fn test_period_scale_direction() {
        assert_eq!(
            key_action(KeyCode::KeyO, false, false),
            Some(KeyAction::Edit(Edit::ScalePeriod(0.5)))
        );
        assert_eq!(
            key_action(KeyCode::KeyO, true, false),
            Some(KeyAction::Edit(Edit::ScalePeriod(2.0)))
        );
    }

    #[test]
    fn test_repeat_only_for_continuous_edits() {
        assert_eq!(key_action(KeyCode::KeyT, false, true), None);
        assert_eq!(key_action(KeyCode::F5, false, true), None);
        assert_eq!(
            key_action(KeyCode::ArrowUp, false, true),
            Some(KeyAction::Edit(Edit::TargetPixelSize(1.0)))
        );
        assert_eq!(
            key_action(KeyCode::BracketRight, false, true),
            Some(KeyAction::Edit(Edit::FasterTime))
        );
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(key_action(KeyCode::KeyZ, false, false), None);
        assert_eq!(
            key_action(KeyCode::Escape, false, false),
            Some(KeyAction::Quit)
        );
    }
}
