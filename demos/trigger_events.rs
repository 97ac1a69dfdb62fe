use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use impulse2d::*;

/// Prints every notification as it arrives.
struct Printer;

impl ContactListener for Printer {
    fn on_collision_enter(&mut self, a: ColliderRef, b: ColliderRef) {
        println!("  collision enter {:?} {:?}", a, b);
    }

    fn on_trigger_enter(&mut self, a: ColliderRef, b: ColliderRef) {
        println!("  trigger enter   {:?} {:?}", a, b);
    }

    fn on_trigger_exit(&mut self, a: ColliderRef, b: ColliderRef) {
        println!("  trigger exit    {:?} {:?}", a, b);
    }
}

fn main() -> Result<()> {
    let mut world = PhysicsWorld::new(WorldConfig {
        enable_timing: true,
        ..Default::default()
    })?;

    // A zone the ball flies through.
    let zone_body = world.create_body();
    world.body_mut(zone_body)?.kind = BodyKind::Static;
    let zone = world.create_collider(zone_body)?;
    {
        let c = world.collider_mut(zone)?;
        c.shape = Rectangle::from_center(Vec2::ZERO, Vec2::new(1.0, 2.0)).into();
        c.is_trigger = true;
    }

    let ball_body = world.create_body();
    {
        let b = world.body_mut(ball_body)?;
        b.position = Vec2::new(-4.0, 0.0);
        b.velocity = Vec2::new(4.0, 0.0);
    }
    let ball = world.create_collider(ball_body)?;
    world.collider_mut(ball)?.shape = Circle::with_radius(0.5).into();

    let printer = Rc::new(RefCell::new(Printer));
    world.set_contact_listener(&printer);
    let log = Rc::new(RefCell::new(EventCollector::new()));

    let dt = 1.0 / 20.0;
    for step in 0..40 {
        if step == 20 {
            // Swap listeners halfway: later events are buffered instead.
            world.set_contact_listener(&log);
        }
        world.update(dt)?;
        let p = world.body(ball_body)?.position;
        if step % 5 == 0 {
            println!("step {:2}: ball at ({:.2}, {:.2})", step, p.x, p.y);
        }
    }

    for ev in log.borrow_mut().drain() {
        println!("buffered: {:?} {:?} {:?}", ev.kind, ev.a, ev.b);
    }
    if let Some(t) = world.timing() {
        println!(
            "last update: {:.3}ms (integrate={:.3}ms index={:.3}ms collide={:.3}ms)",
            t.update_ms, t.integrate_ms, t.rebuild_index_ms, t.collision_pass_ms
        );
    }
    Ok(())
}
