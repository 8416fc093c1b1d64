//! End-to-end rendering scenarios.

use std::ops::ControlFlow;
use std::sync::Arc;

use gt_core::{load_obj, Material, Mesh, Triangle};
use gt_renderer::{
    trace_path, Accumulator, Camera, CameraConfig, Color, Hittable, Interval, PathState,
    RenderConfig, Renderer, Scene, ToneMap, TriangleList, UniformGrid, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_triangle(material: Material) -> Mesh {
    Mesh::new(
        vec![Triangle::new(
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            0,
        )],
        vec![Arc::new(material)],
    )
    .unwrap()
}

fn camera(width: u32, height: u32) -> Camera {
    Camera::new(&CameraConfig {
        position: Vec3::new(0.0, 0.0, 5.0),
        look_at: Vec3::ZERO,
        width,
        height,
        ..Default::default()
    })
}

#[test]
fn centroid_pixel_hits_and_outside_pixels_miss() {
    let mesh = unit_triangle(Material::default());
    let centroid = mesh.triangle(0).centroid();
    let scene = Scene::new(mesh, 8).unwrap();
    let camera = camera(64, 64);
    let mut rng = StdRng::seed_from_u64(1);
    let ray_t = Interval::new(0.0, f32::INFINITY);

    let p = camera.project(centroid).unwrap();
    let ray = camera.get_ray(p.x as u32, p.y as u32, false, &mut rng);
    assert!(scene.hit(&ray, ray_t).is_some());

    // Projected bounds of the triangle
    let corners: Vec<_> = scene
        .mesh()
        .triangle(0)
        .positions
        .iter()
        .map(|v| camera.project(*v).unwrap())
        .collect();
    let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);

    for y in 0..64 {
        for x in 0..64 {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            if cx < min_x - 1.0 || cx > max_x + 1.0 || cy < min_y - 1.0 || cy > max_y + 1.0 {
                let ray = camera.get_ray(x, y, false, &mut rng);
                assert!(scene.hit(&ray, ray_t).is_none(), "pixel ({x}, {y}) should miss");
            }
        }
    }
}

#[test]
fn direct_view_of_light_is_strength_times_color() {
    let base = Color::new(0.9, 0.6, 0.3);
    let mesh = unit_triangle(Material::light("lamp", base, 3.0));
    let centroid = mesh.triangle(0).centroid();
    let scene = Scene::new(mesh, 4).unwrap();
    let camera = camera(32, 32);
    let mut rng = StdRng::seed_from_u64(2);

    let p = camera.project(centroid).unwrap();
    let ray = camera.get_ray(p.x as u32, p.y as u32, false, &mut rng);
    let sample = trace_path(ray, &scene, scene.mesh(), 4, &mut rng);

    assert!(matches!(sample.state, PathState::HitEmissive(_)));
    assert!((sample.radiance - base * 3.0).length() < 1e-5);

    // The accumulated mean agrees once normalized
    let renderer = Renderer::new(
        scene,
        camera,
        RenderConfig {
            samples: 4,
            antialias: false,
            ..Default::default()
        },
    )
    .unwrap();
    let acc = renderer.render(|_| ControlFlow::Continue(())).unwrap();
    let mean = acc.resolve()[(p.y as u32 * 32 + p.x as u32) as usize];
    assert!((mean - base * 3.0).length() < 1e-5);
}

#[test]
fn single_triangle_grid_with_one_cell() {
    let mesh = unit_triangle(Material::default());
    let grid = UniformGrid::build(&mesh, 1).unwrap();
    let dims = grid.dims();

    assert!(dims.iter().all(|&d| d >= 1));
    let bounds = mesh.triangle(0).bounds();
    let lo = grid.voxel_coord(bounds.min());
    let hi = grid.voxel_coord(bounds.max());
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let inside = (lo[0]..=hi[0]).contains(&x)
                    && (lo[1]..=hi[1]).contains(&y)
                    && (lo[2]..=hi[2]).contains(&z);
                let listed = grid.voxel_at([x, y, z]).contains(&0);
                assert_eq!(inside, listed, "voxel ({x}, {y}, {z})");
            }
        }
    }
}

#[test]
fn voxel_lookup_stays_in_range() {
    let mut rng = StdRng::seed_from_u64(3);
    let tris = (0..50)
        .map(|_| {
            let mut p = || {
                Vec3::new(
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(0.0..0.5),
                )
            };
            Triangle::new(p(), p(), p(), 0)
        })
        .collect();
    let mesh = Mesh::new(tris, vec![Arc::new(Material::default())]).unwrap();
    let grid = UniformGrid::build(&mesh, 12).unwrap();
    let bounds = grid.bounds();
    let dims = grid.dims();

    for _ in 0..5000 {
        let t = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        let p = bounds.min() + bounds.extent() * t;
        let c = grid.voxel_coord(p);
        assert!((0..3).all(|a| c[a] < dims[a]));
    }
    let c = grid.voxel_coord(bounds.max());
    assert_eq!(c, [dims[0] - 1, dims[1] - 1, dims[2] - 1]);
}

/// Two facing walls lit by a lamp, rendered through the grid.
fn box_scene() -> Scene {
    let grey = Arc::new(Material::new("grey", Color::splat(0.7)));
    let lamp = Arc::new(Material::light("lamp", Color::ONE, 4.0));

    let quad = |z: f32, size: f32, m: usize| {
        let a = Vec3::new(-size, -size, z);
        let b = Vec3::new(size, -size, z);
        let c = Vec3::new(size, size, z);
        let d = Vec3::new(-size, size, z);
        [Triangle::new(a, b, c, m), Triangle::new(a, c, d, m)]
    };
    let mut tris = quad(-2.0, 2.0, 0).to_vec();
    tris.extend(quad(1.5, 0.4, 1));
    Scene::new(Mesh::new(tris, vec![grey, lamp]).unwrap(), 16).unwrap()
}

#[test]
fn rounds_merge_associatively() {
    let config = RenderConfig {
        samples: 3,
        max_bounces: 4,
        seed: 1234,
        threads: Some(3),
        ..Default::default()
    };
    let renderer = Renderer::new(box_scene(), camera(24, 16), config).unwrap();

    let whole = renderer.render(|_| ControlFlow::Continue(())).unwrap();

    let mut merged = renderer.accumulator();
    for round in 0..3 {
        let mut single = renderer.accumulator();
        renderer.render_round(&mut single, round);
        merged.merge(&single).unwrap();
    }

    assert_eq!(merged.rounds(), 3);
    assert_eq!(whole, merged);
}

#[test]
fn lit_scene_accumulates_light() {
    let renderer = Renderer::new(
        box_scene(),
        camera(24, 16),
        RenderConfig {
            samples: 8,
            max_bounces: 4,
            ..Default::default()
        },
    )
    .unwrap();

    let mut snapshots = 0;
    let acc: Accumulator = renderer
        .render(|cp| {
            snapshots += 1;
            assert_eq!(cp.snapshot().pixels.len(), 24 * 16);
            ControlFlow::Continue(())
        })
        .unwrap();

    assert_eq!(snapshots, 1);
    let total: f32 = acc.sums().iter().map(|c| c.x + c.y + c.z).sum();
    assert!(total > 0.0);
    assert!(acc.sums().iter().all(|c| c.is_finite() && c.min_element() >= 0.0));
}

#[test]
fn grid_agrees_with_brute_force_on_camera_rays() {
    let scene = box_scene();
    let brute = TriangleList::new(scene.mesh());
    let camera = camera(40, 30);
    let mut rng = StdRng::seed_from_u64(5);
    let ray_t = Interval::new(0.0, f32::INFINITY);

    for y in 0..30 {
        for x in 0..40 {
            let ray = camera.get_ray(x, y, true, &mut rng);
            match (brute.hit(&ray, ray_t), scene.hit(&ray, ray_t)) {
                (None, None) => {}
                (Some(a), Some(b)) => assert!((a.t - b.t).abs() < 1e-4, "pixel ({x}, {y})"),
                (a, b) => panic!("pixel ({x}, {y}): brute force {a:?}, grid {b:?}"),
            }
        }
    }
}

#[test]
fn obj_scene_renders_to_png() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("scene.mtl"),
        "newmtl wall\nKd 0.8 0.8 0.8\n\nnewmtl lamp\nKd 1 1 1\nKe 5 5 5\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("scene.obj"),
        "mtllib scene.mtl\n\
         v -2 -2 -1\nv 2 -2 -1\nv 2 2 -1\nv -2 2 -1\n\
         v -0.3 -0.3 1\nv 0.3 -0.3 1\nv 0.3 0.3 1\nv -0.3 0.3 1\n\
         usemtl wall\nf 1 2 3\nf 1 3 4\n\
         usemtl lamp\nf 5 7 6\nf 5 8 7\n",
    )
    .unwrap();

    let mesh = load_obj(dir.path().join("scene.obj")).unwrap();
    assert_eq!(mesh.len(), 4);

    let renderer = Renderer::new(
        Scene::new(mesh, 8).unwrap(),
        camera(16, 16),
        RenderConfig {
            samples: 2,
            tone_map: ToneMap::Reinhard,
            ..Default::default()
        },
    )
    .unwrap();

    let out = dir.path().join("out.png");
    renderer
        .render(|cp| {
            if cp.is_final() {
                cp.snapshot().save(&out).unwrap();
            }
            ControlFlow::Continue(())
        })
        .unwrap();

    let img = image::open(&out).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (16, 16));
}

#[test]
fn rays_grazing_the_top_of_an_integer_scene_hit_like_brute_force() {
    let mesh = Mesh::new(
        vec![
            Triangle::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 2.0), 0),
            Triangle::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 2.0), Vec3::new(2.0, 1.0, 2.0), 0),
        ],
        vec![Arc::new(Material::default())],
    )
    .unwrap();
    let scene = Scene::new(mesh, 4).unwrap();
    let brute = TriangleList::new(scene.mesh());
    let ray_t = Interval::new(0.0, f32::INFINITY);
    let top = scene.grid().bounds().max().y;

    for x in [0.25, 0.5, 1.0, 1.5, 1.75] {
        let ray = gt_renderer::Ray::new(Vec3::new(x, top, 5.0), Vec3::NEG_Z);
        let expected = brute.hit(&ray, ray_t).map(|h| h.t);
        let actual = scene.hit(&ray, ray_t).map(|h| h.t);
        assert_eq!(expected.is_some(), actual.is_some(), "x = {x}");
        if let (Some(e), Some(a)) = (expected, actual) {
            assert!((e - a).abs() < 1e-4, "x = {x}: {e} vs {a}");
        }
    }
}
