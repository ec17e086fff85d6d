//! Interactive sample scenes, driven with the keyboard:
//!
//! 1-9 pick a scene, Space drops a bomb, A/W/P flip the solver toggles,
//! K pauses, N single-steps, arrows pan, the mouse wheel zooms, R resets
//! the view, Escape quits.

use ::rand::rngs::ThreadRng;
use ::rand::thread_rng;
use impulse2d::dynamics::{Body, BodyId, Joint, World};
use impulse2d::math::utils::random_range;
use impulse2d::math::{Mat22, Vec2};
use macroquad::prelude::*;

const TIME_STEP: f32 = 1.0 / 60.0;

fn static_box(world: &mut World, extents: (f32, f32), at: (f32, f32)) -> BodyId {
    let mut b = Body::new(Vec2::new(extents.0, extents.1), f32::INFINITY);
    b.position = Vec2::new(at.0, at.1);
    world.add_body(b)
}

fn dynamic_box(world: &mut World, extents: (f32, f32), at: (f32, f32), mass: f32) -> BodyId {
    let mut b = Body::new(Vec2::new(extents.0, extents.1), mass);
    b.position = Vec2::new(at.0, at.1);
    world.add_body(b)
}

fn floor(world: &mut World) -> BodyId {
    static_box(world, (100.0, 20.0), (0.0, -10.0))
}

/// Softness / bias pair for a spring-like joint, from frequency (Hz),
/// damping ratio and the attached mass.
fn soft_joint_params(frequency: f32, damping: f32, mass: f32) -> (f32, f32) {
    let omega = 2.0 * std::f32::consts::PI * frequency;
    let d = 2.0 * mass * damping * omega;
    let k = mass * omega * omega;
    (1.0 / (d + TIME_STEP * k), TIME_STEP * k / (d + TIME_STEP * k))
}

fn scene_single_box(world: &mut World, _rng: &mut ThreadRng) {
    floor(world);
    dynamic_box(world, (1.0, 1.0), (0.0, 4.0), 200.0);
}

fn scene_pendulum(world: &mut World, _rng: &mut ThreadRng) {
    let ground = floor(world);
    let bob = dynamic_box(world, (1.0, 1.0), (9.0, 11.0), 100.0);
    let joint = Joint::new(world, ground, bob, Vec2::new(0.0, 11.0));
    world.add_joint(joint);
}

fn scene_friction_ramps(world: &mut World, _rng: &mut ThreadRng) {
    floor(world);

    for (extents, at, rotation) in [
        ((13.0, 0.25), (-2.0, 11.0), -0.25),
        ((0.25, 1.0), (5.25, 9.5), 0.0),
        ((13.0, 0.25), (2.0, 7.0), 0.25),
        ((0.25, 1.0), (-5.25, 5.5), 0.0),
        ((13.0, 0.25), (-2.0, 3.0), -0.25),
    ] {
        let id = static_box(world, extents, at);
        world.body_mut(id).rotation = rotation;
    }

    for (i, friction) in [0.75, 0.5, 0.35, 0.1, 0.0].into_iter().enumerate() {
        let id = dynamic_box(world, (0.5, 0.5), (-7.5 + 2.0 * i as f32, 14.0), 25.0);
        world.body_mut(id).friction = friction;
    }
}

fn scene_random_stack(world: &mut World, rng: &mut ThreadRng) {
    floor(world);

    for i in 0..10 {
        let x = random_range(rng, -0.1, 0.1);
        let id = dynamic_box(world, (1.0, 1.0), (x, 0.51 + 1.05 * i as f32), 1.0);
        world.body_mut(id).friction = 0.2;
    }
}

fn scene_pyramid(world: &mut World, _rng: &mut ThreadRng) {
    floor(world);

    let mut row = Vec2::new(-6.0, 0.75);
    for i in 0..12 {
        let mut at = row;
        for _ in i..12 {
            let id = dynamic_box(world, (1.0, 1.0), (at.x, at.y), 10.0);
            world.body_mut(id).friction = 0.2;
            at.x += 1.125;
        }
        row += Vec2::new(0.5625, 2.0);
    }
}

fn scene_teeter(world: &mut World, _rng: &mut ThreadRng) {
    let ground = floor(world);
    let plank = dynamic_box(world, (12.0, 0.25), (0.0, 1.0), 100.0);
    dynamic_box(world, (0.5, 0.5), (-5.0, 2.0), 25.0);
    dynamic_box(world, (0.5, 0.5), (-5.5, 2.0), 25.0);
    dynamic_box(world, (1.0, 1.0), (5.5, 15.0), 100.0);

    let pivot = Joint::new(world, ground, plank, Vec2::new(0.0, 1.0));
    world.add_joint(pivot);
}

fn scene_bridge(world: &mut World, _rng: &mut ThreadRng) {
    let ground = floor(world);

    let num_planks = 15;
    let mass = 50.0;
    let (softness, bias_factor) = soft_joint_params(2.0, 0.7, mass);

    let mut prev = ground;
    for i in 0..num_planks {
        let id = dynamic_box(world, (1.0, 0.25), (-8.5 + 1.25 * i as f32, 5.0), mass);
        world.body_mut(id).friction = 0.2;

        let mut joint = Joint::new(world, prev, id, Vec2::new(-9.125 + 1.25 * i as f32, 5.0));
        joint.softness = softness;
        joint.bias_factor = bias_factor;
        world.add_joint(joint);
        prev = id;
    }

    let mut closing = Joint::new(
        world,
        prev,
        ground,
        Vec2::new(-9.125 + 1.25 * num_planks as f32, 5.0),
    );
    closing.softness = softness;
    closing.bias_factor = bias_factor;
    world.add_joint(closing);
}

fn scene_dominos(world: &mut World, _rng: &mut ThreadRng) {
    let ground = floor(world);
    static_box(world, (12.0, 0.5), (-1.5, 10.0));

    for i in 0..10 {
        let id = dynamic_box(world, (0.2, 2.0), (-6.0 + i as f32, 11.125), 10.0);
        world.body_mut(id).friction = 0.1;
    }

    let ramp = static_box(world, (14.0, 0.5), (1.0, 6.0));
    world.body_mut(ramp).rotation = 0.3;

    let post = static_box(world, (0.5, 3.0), (-7.0, 4.0));
    let beam = dynamic_box(world, (12.0, 0.25), (-0.9, 1.0), 20.0);
    let hinge = Joint::new(world, ground, beam, Vec2::new(-2.0, 1.0));
    world.add_joint(hinge);

    let weight = dynamic_box(world, (0.5, 0.5), (-10.0, 15.0), 10.0);
    let sling = Joint::new(world, post, weight, Vec2::new(-7.0, 15.0));
    world.add_joint(sling);

    let wheel = dynamic_box(world, (2.0, 2.0), (6.0, 2.5), 20.0);
    world.body_mut(wheel).friction = 0.1;
    let axle = Joint::new(world, ground, wheel, Vec2::new(6.0, 2.6));
    world.add_joint(axle);

    let lid = dynamic_box(world, (2.0, 0.2), (6.0, 3.6), 10.0);
    let tie = Joint::new(world, wheel, lid, Vec2::new(7.0, 3.5));
    world.add_joint(tie);
}

fn scene_chain(world: &mut World, _rng: &mut ThreadRng) {
    let ground = floor(world);

    let mass = 10.0;
    let (softness, bias_factor) = soft_joint_params(4.0, 0.7, mass);

    let y = 12.0;
    let mut prev = ground;
    for i in 0..15 {
        let id = dynamic_box(world, (0.75, 0.25), (0.5 + i as f32, y), mass);
        world.body_mut(id).friction = 0.2;

        let mut link = Joint::new(world, prev, id, Vec2::new(i as f32, y));
        link.softness = softness;
        link.bias_factor = bias_factor;
        world.add_joint(link);
        prev = id;
    }
}

type SceneFn = fn(&mut World, &mut ThreadRng);

const SCENES: [(&str, SceneFn); 9] = [
    ("A single box", scene_single_box),
    ("Simple pendulum", scene_pendulum),
    ("Varying friction coefficients", scene_friction_ramps),
    ("Randomized stacking", scene_random_stack),
    ("Pyramid stacking", scene_pyramid),
    ("A teeter", scene_teeter),
    ("A suspension bridge", scene_bridge),
    ("Dominos", scene_dominos),
    ("Multi-pendulum", scene_chain),
];

struct View {
    /// Half-height of the visible world slice, in meters.
    zoom: f32,
    center: Vec2,
}

impl Default for View {
    fn default() -> Self {
        Self {
            zoom: 12.0,
            center: Vec2::new(0.0, 7.0),
        }
    }
}

impl View {
    fn scale(&self) -> f32 {
        screen_height().max(1.0) / (2.0 * self.zoom)
    }

    fn to_screen(&self, p: Vec2) -> (f32, f32) {
        let s = self.scale();
        (
            screen_width() * 0.5 + (p.x - self.center.x) * s,
            screen_height() * 0.5 - (p.y - self.center.y) * s,
        )
    }
}

fn draw_box(view: &View, body: &Body, color: Color) {
    let rot = Mat22::from_angle(body.rotation);
    let h = 0.5 * body.width;

    let corners = [
        body.position + rot * Vec2::new(-h.x, -h.y),
        body.position + rot * Vec2::new(h.x, -h.y),
        body.position + rot * Vec2::new(h.x, h.y),
        body.position + rot * Vec2::new(-h.x, h.y),
    ];
    for i in 0..4 {
        let (x1, y1) = view.to_screen(corners[i]);
        let (x2, y2) = view.to_screen(corners[(i + 1) % 4]);
        draw_line(x1, y1, x2, y2, 1.5, color);
    }
}

fn launch_bomb(world: &mut World, bomb: &mut Option<BodyId>, rng: &mut ThreadRng) {
    let id = *bomb.get_or_insert_with(|| {
        let mut b = Body::new(Vec2::new(1.0, 1.0), 50.0);
        b.friction = 0.2;
        world.add_body(b)
    });

    let b = world.body_mut(id);
    b.position = Vec2::new(random_range(rng, -15.0, 15.0), 15.0);
    b.rotation = random_range(rng, -1.5, 1.5);
    b.velocity = -1.5 * b.position;
    b.angular_velocity = random_range(rng, -20.0, 20.0);
}

#[macroquad::main("impulse2d demos")]
async fn main() {
    let mut rng = thread_rng();
    let mut world = World::new(Vec2::new(0.0, -10.0), 10);

    let mut scene = 0usize;
    let mut bomb: Option<BodyId> = None;
    let mut view = View::default();
    let mut paused = false;

    (SCENES[scene].1)(&mut world, &mut rng);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let digits = [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::Key6,
            KeyCode::Key7,
            KeyCode::Key8,
            KeyCode::Key9,
        ];
        for (i, key) in digits.into_iter().enumerate() {
            if is_key_pressed(key) {
                scene = i;
                bomb = None;
                world.clear();
                (SCENES[scene].1)(&mut world, &mut rng);
            }
        }

        if is_key_pressed(KeyCode::Space) {
            launch_bomb(&mut world, &mut bomb, &mut rng);
        }
        if is_key_pressed(KeyCode::A) {
            world.config.accumulate_impulses = !world.config.accumulate_impulses;
        }
        if is_key_pressed(KeyCode::W) {
            world.config.warm_starting = !world.config.warm_starting;
        }
        if is_key_pressed(KeyCode::P) {
            world.config.position_correction = !world.config.position_correction;
        }
        if is_key_pressed(KeyCode::K) {
            paused = !paused;
        }
        if is_key_pressed(KeyCode::R) {
            view = View::default();
        }

        if is_key_down(KeyCode::Left) {
            view.center.x -= 0.02 * view.zoom;
        }
        if is_key_down(KeyCode::Right) {
            view.center.x += 0.02 * view.zoom;
        }
        if is_key_down(KeyCode::Down) {
            view.center.y -= 0.02 * view.zoom;
        }
        if is_key_down(KeyCode::Up) {
            view.center.y += 0.02 * view.zoom;
        }
        let wheel = mouse_wheel().1;
        if wheel != 0.0 {
            view.zoom = (view.zoom * (1.0 - 0.1 * wheel)).clamp(2.0, 60.0);
        }

        if !paused || is_key_pressed(KeyCode::N) {
            world.step(TIME_STEP);
        }

        clear_background(BLACK);

        for (i, body) in world.bodies().iter().enumerate() {
            let color = if bomb == Some(BodyId(i)) {
                Color::new(0.4, 0.9, 0.4, 1.0)
            } else {
                Color::new(0.8, 0.8, 0.9, 1.0)
            };
            draw_box(&view, body, color);
        }

        for joint in world.joints() {
            let (p1, p2) = joint.anchors(&world);
            let x1 = world.body(joint.body_a).position;
            let x2 = world.body(joint.body_b).position;

            let link = Color::new(0.5, 0.5, 0.8, 1.0);
            let (ax, ay) = view.to_screen(x1);
            let (bx, by) = view.to_screen(p2);
            draw_line(ax, ay, bx, by, 1.0, link);
            let (cx, cy) = view.to_screen(x2);
            let (dx, dy) = view.to_screen(p1);
            draw_line(cx, cy, dx, dy, 1.0, link);
        }

        for arbiter in world.arbiters().values() {
            for contact in &arbiter.contacts[..arbiter.count] {
                let (x, y) = view.to_screen(contact.position);
                draw_circle(x, y, 2.5, RED);
            }
        }

        let overlay = [
            format!("Demo {}: {}", scene + 1, SCENES[scene].0),
            format!(
                "1-9 scenes | Space bomb | (A)ccumulate={} (W)arm={} (P)osCorr={}",
                world.config.accumulate_impulses,
                world.config.warm_starting,
                world.config.position_correction,
            ),
            "K pause | N step | arrows pan | wheel zoom | R reset".to_string(),
            format!(
                "bodies={} joints={} arbiters={}",
                world.bodies().len(),
                world.joints().len(),
                world.arbiters().len(),
            ),
        ];
        for (i, line) in overlay.iter().enumerate() {
            draw_text(line, 10.0, 20.0 + 18.0 * i as f32, 18.0, WHITE);
        }

        next_frame().await;
    }
}
