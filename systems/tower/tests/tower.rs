use std::time::Duration;

use glam::Vec2;
use grid_siege_core::{GridLayout, GridPoint};
use grid_siege_system_tower::{Tower, RECENT_DAMAGE_WINDOW};

#[test]
fn overkill_clamps_to_zero_and_recent_flag_expires() {
    let mut tower = Tower::new(&GridLayout::default());
    tower.take_damage(25);

    assert_eq!(tower.current_health(), 0);
    assert!(tower.is_destroyed());
    assert!(tower.recently_damaged());

    tower.advance(Duration::from_millis(499));
    assert!(tower.recently_damaged());

    tower.advance(Duration::from_millis(1));
    assert!(!tower.recently_damaged());
}

#[test]
fn each_hit_restarts_the_window() {
    let mut tower = Tower::new(&GridLayout::default());
    tower.take_damage(1);
    tower.advance(Duration::from_millis(400));
    tower.take_damage(1);
    tower.advance(Duration::from_millis(400));

    assert!(tower.recently_damaged());
    tower.advance(RECENT_DAMAGE_WINDOW);
    assert!(!tower.recently_damaged());
}

#[test]
fn healing_never_exceeds_maximum() {
    let mut tower = Tower::with_max_health(12, &GridLayout::default());
    tower.take_damage(4);
    tower.heal(100);
    assert_eq!(tower.current_health(), 12);

    tower.take_damage(u32::MAX);
    assert_eq!(tower.current_health(), 0);
    tower.heal(u32::MAX);
    assert_eq!(tower.current_health(), 12);
}

#[test]
fn pixel_placement_snaps_to_containing_cell() {
    let layout = GridLayout::new(8, 8, 32.0, Vec2::new(100.0, 50.0));
    let mut tower = Tower::new(&layout);
    tower.set_pixel_position(170.0, 60.0, &layout);

    assert_eq!(tower.cell(), GridPoint::at(0, 2));
    assert_eq!(tower.pixel_position(), Vec2::new(180.0, 66.0));
}

#[test]
fn healing_does_not_touch_the_damage_window() {
    let mut tower = Tower::new(&GridLayout::default());
    tower.heal(5);
    assert!(!tower.recently_damaged());
}
