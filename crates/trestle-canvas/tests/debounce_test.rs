use std::time::{Duration, Instant};
use trestle_canvas::{SaveDebouncer, SaveRequest};

#[test]
fn positions_save_once_after_the_quiet_period() {
    let start = Instant::now();
    let ms = Duration::from_millis;
    let mut d = SaveDebouncer::new(ms(500));

    assert_eq!(d.poll(start), None);
    assert!(!d.is_pending());

    d.node_moved(start);
    d.node_moved(start + ms(100));
    assert!(d.is_pending());
    assert_eq!(d.deadline(), Some(start + ms(600)));

    assert_eq!(d.poll(start + ms(550)), None);
    assert_eq!(d.poll(start + ms(600)), Some(SaveRequest::Positions));
    assert_eq!(d.poll(start + ms(2000)), None);
    assert!(!d.is_pending());
}

#[test]
fn every_move_restarts_the_quiet_period() {
    let start = Instant::now();
    let ms = Duration::from_millis;
    let mut d = SaveDebouncer::new(ms(500));

    for step in 0..10 {
        d.node_moved(start + ms(step * 400));
        assert_eq!(d.poll(start + ms(step * 400 + 450)), None);
    }
    assert_eq!(d.poll(start + ms(9 * 400 + 500)), Some(SaveRequest::Positions));
}

#[test]
fn flush_emits_a_pending_save_immediately() {
    let start = Instant::now();
    let mut d = SaveDebouncer::new(Duration::from_millis(500));
    assert_eq!(d.flush(), None);

    d.node_moved(start);
    assert_eq!(d.flush(), Some(SaveRequest::Positions));
    assert_eq!(d.flush(), None);
    assert_eq!(d.poll(start + Duration::from_secs(5)), None);
    assert_eq!(d.quiet_period(), Duration::from_millis(500));
}
