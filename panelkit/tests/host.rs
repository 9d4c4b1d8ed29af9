//! Tests for presenting and dismissing panels through the host.

use std::rc::Rc;
use std::time::{Duration, Instant};

use panelkit::prelude::*;
use panelkit::{PanelError, PanelPhase, TintMode};
use sheetdom::{GesturePhase, PanEvent, PointerInput, PointerKind};

struct Fixture {
    host: ModalHost,
    root: ScreenId,
    sheet: ScreenId,
    content: Rc<FixedContent>,
}

fn fixture() -> Fixture {
    let mut host = ModalHost::new(Rect::from_size(400.0, 800.0), Insets::ZERO);
    let root = host.register(Rc::new(FixedContent::new(800.0)));
    let content = Rc::new(FixedContent::new(300.0));
    let sheet = host.register(content.clone());
    Fixture {
        host,
        root,
        sheet,
        content,
    }
}

fn presented(now: Instant) -> Fixture {
    let mut f = fixture();
    PanelPresenter::for_screen(f.sheet)
        .present(&mut f.host, f.root, false, now)
        .unwrap();
    f.host.take_events();
    f
}

fn pan(phase: GesturePhase, y: f32, ty: f32, vy: f32, at: Instant) -> PanEvent {
    PanEvent::new(phase, Point::new(200.0, y + ty), ty, vy, at)
}

fn phase(f: &Fixture) -> PanelPhase {
    f.host.panel(f.sheet).map_or(PanelPhase::Idle, |panel| panel.phase())
}

// =============================================================================
// Presenting
// =============================================================================

#[test]
fn test_animated_presentation() {
    let t0 = Instant::now();
    let mut f = fixture();
    {
        // The presenter doesn't need to outlive the call.
        let presenter = PanelPresenter::for_screen(f.sheet);
        presenter.present(&mut f.host, f.root, true, t0).unwrap();
    }

    assert_eq!(f.host.presented_screen(), Some(f.sheet));
    assert_eq!(f.host.presenting_screen(), Some(f.root));
    assert!(f.host.is_transitioning());
    assert_eq!(phase(&f), PanelPhase::AnimatingPresent);
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Dimmed));
    assert_eq!(f.host.panel(f.sheet).unwrap().translation(), 300.0);
    assert!(f.host.take_events().is_empty());

    f.host.tick(t0 + Duration::from_millis(520));
    assert_eq!(f.host.take_events(), vec![HostEvent::Presented(f.sheet)]);
    assert!(!f.host.is_transitioning());
    assert_eq!(phase(&f), PanelPhase::Idle);
    assert_eq!(f.host.panel(f.sheet).unwrap().translation(), 0.0);
}

#[test]
fn test_unanimated_presentation_completes_at_once() {
    let t0 = Instant::now();
    let mut f = fixture();
    PanelPresenter::for_screen(f.sheet)
        .present(&mut f.host, f.root, false, t0)
        .unwrap();
    assert_eq!(f.host.take_events(), vec![HostEvent::Presented(f.sheet)]);
    assert_eq!(phase(&f), PanelPhase::Idle);
    assert!((f.host.panel(f.sheet).unwrap().views().dim_alpha - 0.45).abs() < 1e-6);
}

#[test]
fn test_cross_fade_presentation() {
    let t0 = Instant::now();
    let mut f = fixture();
    f.host.set_motion_preferences(MotionPreferences {
        reduce_motion: true,
        prefers_cross_fade: false,
    });
    PanelPresenter::for_screen(f.sheet)
        .present(&mut f.host, f.root, true, t0)
        .unwrap();

    let views = f.host.panel(f.sheet).unwrap().views();
    assert_eq!(views.opacity, 0.0);
    assert_eq!(views.translation, 0.0);

    f.host.tick(t0 + Duration::from_millis(210));
    assert_eq!(f.host.take_events(), vec![HostEvent::Presented(f.sheet)]);
    assert_eq!(f.host.panel(f.sheet).unwrap().views().opacity, 1.0);
}

#[test]
fn test_presenter_tint_left_alone_when_disabled() {
    let t0 = Instant::now();
    let mut f = fixture();
    PanelPresenter::for_screen(f.sheet)
        .with_options(PanelOptions::new().adjust_presenter_tint(false))
        .present(&mut f.host, f.root, false, t0)
        .unwrap();
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Automatic));
}

#[test]
fn test_presentation_errors() {
    let t0 = Instant::now();
    let mut f = fixture();
    let stranger = ScreenId::new();

    assert_eq!(
        PanelPresenter::new().present(&mut f.host, f.root, true, t0),
        Err(PanelError::NoBoundScreen)
    );
    assert_eq!(
        PanelPresenter::for_screen(f.root).present(&mut f.host, f.root, true, t0),
        Err(PanelError::SelfPresentation(f.root))
    );
    assert_eq!(
        PanelPresenter::for_screen(stranger).present(&mut f.host, f.root, true, t0),
        Err(PanelError::ScreenNotFound(stranger))
    );
    assert_eq!(
        PanelPresenter::for_screen(f.sheet).present(&mut f.host, stranger, true, t0),
        Err(PanelError::ScreenNotFound(stranger))
    );
    assert_eq!(f.host.presented_screen(), None);

    let other = f.host.register(Rc::new(FixedContent::new(100.0)));
    PanelPresenter::for_screen(f.sheet)
        .present(&mut f.host, f.root, true, t0)
        .unwrap();
    assert_eq!(
        PanelPresenter::for_screen(other).present(&mut f.host, f.root, true, t0),
        Err(PanelError::AlreadyPresenting(f.sheet))
    );
    assert_eq!(
        f.host.dismiss(other, true, t0),
        Err(PanelError::NotPresented(other))
    );
    assert!(matches!(
        PanelPresenter::for_screen(other).controller(&mut f.host),
        Err(PanelError::NotPresented(_))
    ));
}

#[test]
fn test_presenter_forwards_to_controller() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    let presenter = PanelPresenter::for_screen(f.sheet);

    f.content.set_height(400.0);
    presenter.set_needs_scroll_view_update(&mut f.host).unwrap();
    presenter.layout_if_needed(&mut f.host).unwrap();
    assert_eq!(
        f.host.panel(f.sheet).unwrap().content_metrics().content_height,
        400.0
    );

    let mut done = presenter
        .animate_changes(&mut f.host, t0, |options| options.dim_opacity = 0.6)
        .unwrap();
    f.host.tick(t0 + Duration::from_millis(420));
    assert_eq!(done.try_finished(), Some(true));
    assert_eq!(presenter.controller(&mut f.host).unwrap().options().dim_opacity, 0.6);
}

// =============================================================================
// Dismissing
// =============================================================================

#[test]
fn test_programmatic_dismissal() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Dimmed));

    f.host.dismiss(f.sheet, true, t0).unwrap();
    assert_eq!(phase(&f), PanelPhase::AnimatingDismiss);
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Automatic));

    // Already dismissing.
    f.host.dismiss(f.sheet, true, t0).unwrap();

    f.host.tick(t0 + Duration::from_millis(210));
    assert_eq!(f.host.take_events(), vec![HostEvent::Dismissed(f.sheet)]);
    assert_eq!(f.host.presented_screen(), None);
    assert!(f.host.panel(f.sheet).is_none());
}

#[test]
fn test_dismissal_overtakes_presentation() {
    let t0 = Instant::now();
    let mut f = fixture();
    PanelPresenter::for_screen(f.sheet)
        .present(&mut f.host, f.root, true, t0)
        .unwrap();
    f.host.dismiss(f.sheet, false, t0).unwrap();
    assert_eq!(
        f.host.take_events(),
        vec![HostEvent::Presented(f.sheet), HostEvent::Dismissed(f.sheet)]
    );
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Automatic));
}

#[test]
fn test_drag_dismissal() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    f.host.handle_pan(&pan(GesturePhase::Began, 600.0, 0.0, 0.0, t0));
    f.host.handle_pan(&pan(GesturePhase::Changed, 600.0, 40.0, 800.0, t0));
    f.host.handle_pan(&pan(GesturePhase::Ended, 600.0, 40.0, 800.0, t0));

    assert_eq!(phase(&f), PanelPhase::AnimatingDismiss);
    assert_eq!(f.host.panel(f.sheet).unwrap().translation(), 40.0);

    f.host.tick(t0 + Duration::from_millis(100));
    assert!(f.host.panel(f.sheet).unwrap().translation() > 40.0);

    f.host.tick(t0 + Duration::from_millis(210));
    assert_eq!(f.host.take_events(), vec![HostEvent::Dismissed(f.sheet)]);
}

#[test]
fn test_tap_outside_through_pointer_input() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    let at = Point::new(200.0, 100.0);
    assert!(!f.host.handle_pointer(PointerInput::new(PointerKind::Down, at, t0)));
    assert!(f.host.handle_pointer(PointerInput::new(
        PointerKind::Up,
        at,
        t0 + Duration::from_millis(50)
    )));
    assert_eq!(phase(&f), PanelPhase::AnimatingDismiss);
}

#[test]
fn test_tap_on_undismissible_panel_does_nothing() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    f.content.set_dismissible(false);
    assert!(!f.host.handle_tap(Point::new(200.0, 100.0), t0));
    assert_eq!(phase(&f), PanelPhase::Idle);
}

#[test]
fn test_drag_catches_dismissing_panel() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    f.host.handle_tap(Point::new(200.0, 100.0), t0);
    assert_eq!(phase(&f), PanelPhase::AnimatingDismiss);
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Automatic));

    let t1 = t0 + Duration::from_millis(100);
    f.host.handle_pan(&pan(GesturePhase::Began, 700.0, 0.0, 0.0, t1));
    assert_eq!(f.host.take_events(), vec![HostEvent::DismissCancelled(f.sheet)]);
    assert_eq!(phase(&f), PanelPhase::Dragging);
    assert_eq!(f.host.tint_mode(f.root), Some(TintMode::Dimmed));
    assert!(!f.host.is_transitioning());

    let caught = f.host.panel(f.sheet).unwrap().translation();
    assert!(caught > 0.0 && caught < 300.0, "caught at {}", caught);

    f.host.handle_pan(&pan(GesturePhase::Ended, 700.0, 0.0, -100.0, t1));
    assert_eq!(phase(&f), PanelPhase::SpringingBack);

    f.host.tick(t1 + Duration::from_millis(420));
    assert_eq!(phase(&f), PanelPhase::Idle);
    let views = f.host.panel(f.sheet).unwrap().views();
    assert_eq!(views.translation, 0.0);
    assert!((views.dim_alpha - 0.45).abs() < 1e-6);
    assert_eq!(f.host.presented_screen(), Some(f.sheet));
}

#[test]
fn test_unregistering_presenter_removes_panel() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    assert!(f.host.unregister(f.root).is_some());
    assert_eq!(f.host.take_events(), vec![HostEvent::Dismissed(f.sheet)]);
    assert_eq!(f.host.presented_screen(), None);
    assert!(f.host.is_registered(f.sheet));
    assert!(!f.host.is_registered(f.root));
}

#[test]
fn test_keyboard_and_bounds_reach_panel() {
    let t0 = Instant::now();
    let mut f = presented(t0);
    f.host.set_keyboard_frame(Some(Rect::new(0.0, 600.0, 400.0, 200.0)));
    assert_eq!(f.host.panel(f.sheet).unwrap().keyboard_inset(), 208.0);

    // The keyboard now sits entirely below the shrunken screen.
    f.host.set_bounds(Rect::from_size(400.0, 600.0), Insets::ZERO);
    let panel = f.host.panel(f.sheet).unwrap();
    assert_eq!(panel.keyboard_inset(), 0.0);
    assert_eq!(panel.content_metrics().available_height, 590.0);
    assert_eq!(panel.content_metrics().content_height, 300.0);
}
