//! The built-in project overview deck.

use deck_core::{ContentNode, DeckDescription, Result, Rgb, SlideDescription, StyleSpec};

/// Heading color used on the cover slide.
const HEADING_COLOR: Rgb = Rgb {
    r: 31,
    g: 73,
    b: 125,
};

/// A level-0 heading with level-1 items beneath it.
fn section(heading: &str, items: &[&str]) -> Result<ContentNode> {
    items.iter().try_fold(ContentNode::new(heading, 0), |node, item| {
        node.with_child(ContentNode::new(*item, 1))
    })
}

/// A level-0 heading with `label: detail` rows beneath it at a fixed size.
fn table(heading: &str, rows: &[(&str, &str)], font_size_pt: f32) -> Result<ContentNode> {
    let style = StyleSpec::new().with_font_size(font_size_pt);
    rows.iter().try_fold(ContentNode::new(heading, 0), |node, (label, detail)| {
        node.with_child(ContentNode::entry(label, detail, 1).with_style(style.clone()))
    })
}

fn slide(title: &str, body: Vec<ContentNode>) -> Result<SlideDescription> {
    let mut slide = SlideDescription::content(title);
    slide.extend(body)?;
    Ok(slide)
}

/// Build the thirteen-slide overview of the 3D barracks simulation project.
pub fn project_overview() -> Result<DeckDescription> {
    let mut deck = DeckDescription::new();

    deck.add_slide(
        SlideDescription::title_slide(
            "3D Barracks Simulation",
            "An interactive 3D web application built on Three.js",
        )
        .with_title_style(
            StyleSpec::new()
                .with_font_size(44.0)
                .with_bold(true)
                .with_color(HEADING_COLOR),
        ),
    );

    deck.add_slide(slide(
        "Project Overview",
        vec![
            section(
                "Purpose",
                &["A realistic 3D barracks environment that runs in the web browser"],
            )?,
            section(
                "Key features",
                &[
                    "Interactive avatar control (WASD movement)",
                    "Realistic PBR (Physically Based Rendering)",
                    "Real-time animation (lights, windows, door)",
                    "High quality shadows and lighting",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Technology Stack",
        vec![
            section(
                "Core framework",
                &[
                    "Three.js v0.161.0 - 3D graphics library",
                    "WebGL Renderer - hardware accelerated rendering",
                ],
            )?,
            section(
                "Rendering techniques",
                &[
                    "PBR Materials (MeshStandardMaterial)",
                    "ACES Filmic Tone Mapping",
                    "PCF Soft Shadows (4096x4096 resolution)",
                    "Texture maps: Diffuse, Normal, Roughness",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Project Architecture",
        vec![table(
            "Module structure",
            &[
                ("main.js", "application bootstrap and initialization"),
                ("scene/SceneManager.js", "Three.js scene, camera and renderer setup"),
                ("scene/LightManager.js", "lighting system"),
                ("objects/Barracks.js", "main barracks orchestrator"),
                ("objects/Avatar.js", "player character"),
                ("controls/AvatarController.js", "WASD keyboard input"),
                ("controls/CameraController.js", "mouse camera control"),
                ("loaders/", "texture and 3D model loading"),
            ],
            16.0,
        )?],
    )?);

    deck.add_slide(slide(
        "Scene Management",
        vec![
            section(
                "SceneManager (scene/SceneManager.js)",
                &[
                    "Three.js scene initialization",
                    "PerspectiveCamera setup (FOV: 75°)",
                    "WebGL renderer setup (antialiasing, shadows)",
                    "Responsive window resize handling",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "LightManager (scene/LightManager.js)",
                &[
                    "Ambient Light - soft indirect light",
                    "Directional Light - sunlight through the windows",
                    "Point Lights - four ceiling lights",
                    "Spotlights - four window effects",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Object System: Barracks Structure",
        vec![
            ContentNode::new("Barracks.js - main orchestrator", 0),
            section(
                "Room structure",
                &[
                    "Floor: marble texture (PBR mapping)",
                    "Four walls: door opening in the back wall (3m x 5m)",
                    "Ceiling: procedural canvas texture",
                    "Dust particle system (200 particles)",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Object System: Furniture and Objects",
        vec![table(
            "Main furniture (23 objects in total)",
            &[
                ("Bunk bed (BunkBed.js)", "6 - sheets move in the wind"),
                ("Chest of drawers (Chester.js)", "8 - one per bed, animated drawers"),
                ("Locker (Locker.js)", "1 - personal storage"),
                ("Window (Window.js)", "4 - day and night color animation"),
                ("Door (Door.js)", "1 - opens automatically on approach"),
                ("TV (TV.js)", "1 - flickering screen"),
                ("Radiator (Radiator.js)", "2 - heat effect"),
                ("Ceiling fan (CeilingFan.js)", "1 - rotation animation"),
            ],
            15.0,
        )?],
    )?);

    deck.add_slide(slide(
        "Avatar and Control System",
        vec![
            section(
                "Avatar (objects/Avatar.js)",
                &[
                    "Simple character built from head, torso, arms and legs",
                    "Uniform color (military green: #4A5D23)",
                    "Casts shadows",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "AvatarController (controls/AvatarController.js)",
                &[
                    "WASD keyboard movement",
                    "Movement relative to the camera",
                    "Room boundary collision (±9, ±7 units)",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "CameraController (controls/CameraController.js)",
                &[
                    "Mouse drag rotates the camera (yaw/pitch)",
                    "Mouse wheel zoom (3-15 units)",
                    "Third person view following the avatar",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Rendering Techniques",
        vec![
            section(
                "PBR (Physically Based Rendering)",
                &[
                    "MeshStandardMaterial",
                    "Diffuse/Albedo map - base color",
                    "Normal map - surface detail",
                    "Roughness map - roughness",
                    "Metalness parameter",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "Advanced renderer settings",
                &[
                    "ACES Filmic Tone Mapping - cinematic color",
                    "sRGB color space encoding",
                    "PCF Soft Shadows - soft shadows",
                    "4096x4096 shadow map resolution",
                    "Antialiasing and high pixel ratio support",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Animation System",
        vec![table(
            "Real-time animations (8 in total)",
            &[
                ("Ceiling light flicker", "fast flicker, slow pulse and random noise"),
                ("TV screen pulse", "blue glow animation"),
                ("Window color cycle", "day to evening to night"),
                ("Bed sheet wind", "UV offset animation"),
                ("Ceiling fan", "continuous rotation"),
                ("Door", "smooth swing on approach (< 3 units)"),
                ("Dust particles", "Brownian motion simulation"),
                ("Radiator heat", "heat shimmer animation"),
            ],
            16.0,
        )?],
    )?);

    deck.add_slide(slide(
        "Feature Summary",
        vec![
            section(
                "Interaction",
                &[
                    "WASD avatar movement (camera relative)",
                    "Mouse drag and wheel camera control",
                    "Automatic door (proximity detection)",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "Visual effects",
                &[
                    "PBR materials and texture mapping",
                    "9 light sources (point, spot, directional)",
                    "8 real-time animations",
                    "High quality shadows (4K resolution)",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "Asset management",
                &[
                    "GLB 3D model loading (5 models)",
                    "PBR texture sets (marble, linen)",
                    "Error handling and load timeouts",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Project Statistics",
        vec![
            section(
                "Code size",
                &[
                    "17 JavaScript files",
                    "About 1,687 lines of code",
                    "Project size: ~80MB",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "3D assets",
                &[
                    "5 GLB models (door, window, TV, fan, radiator)",
                    "2 PBR texture sets (marble, linen)",
                    "23 scene objects in total",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "Modules",
                &[
                    "Scene: 2 (SceneManager, LightManager)",
                    "Controls: 2 (Avatar, Camera)",
                    "Objects: 9 (Barracks, Avatar, furniture)",
                    "Loaders: 2 (Texture, Model)",
                ],
            )?,
        ],
    )?);

    deck.add_slide(slide(
        "Highlights and Outcomes",
        vec![
            section(
                "Technical outcomes",
                &[
                    "Advanced Three.js features (lighting, materials, shadows, animation)",
                    "Modular architecture with clear separation of concerns",
                    "Asset loading with error handling",
                    "Real-time animation system",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "User experience",
                &[
                    "Intuitive WASD and mouse controls",
                    "Immersive 3D environment",
                    "Real-time interaction (door opening)",
                ],
            )?,
            ContentNode::spacer(0),
            section(
                "Next steps",
                &[
                    "More interactive objects (drawers, lockers)",
                    "More animations and effects",
                    "Performance work (LOD, instancing)",
                ],
            )?,
        ],
    )?);

    Ok(deck)
}
