//! The WGSL sources must parse, validate, and agree with the host-side
//! uniform structs and dispatch constants.

use std::mem::{offset_of, size_of};

use glowfield_render::pipeline::{SimUniforms, SpriteUniforms, MAX_ATTRACTORS, WORKGROUP_SIZE};

const SIMULATE_WGSL: &str = include_str!("../src/shaders/simulate.wgsl");
const SPRITE_WGSL: &str = include_str!("../src/shaders/sprite.wgsl");

fn parse_and_validate(name: &str, source: &str) -> naga::Module {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(e) => panic!("Failed to parse {}:\n{}", name, e.emit_to_string(source)),
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("Failed to validate {}:\n{:?}", name, e);
    }
    module
}

/// Size and member offsets of a named WGSL struct
fn struct_layout(module: &naga::Module, name: &str) -> (u32, Vec<(String, u32)>) {
    for (_, ty) in module.types.iter() {
        if ty.name.as_deref() != Some(name) {
            continue;
        }
        if let naga::TypeInner::Struct { members, span } = &ty.inner {
            let offsets = members
                .iter()
                .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
                .collect();
            return (*span, offsets);
        }
    }
    panic!("struct {} not found", name);
}

fn member_offset(layout: &[(String, u32)], name: &str) -> usize {
    layout
        .iter()
        .find(|(member, _)| member == name)
        .map(|(_, offset)| *offset as usize)
        .unwrap_or_else(|| panic!("member {} not found", name))
}

fn entry_point<'a>(module: &'a naga::Module, name: &str) -> &'a naga::EntryPoint {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == name)
        .unwrap_or_else(|| panic!("entry point {} not found", name))
}

/// (group, binding) pairs of every resource the module declares
fn bindings(module: &naga::Module) -> Vec<(u32, u32)> {
    let mut bindings: Vec<_> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.group, b.binding)))
        .collect();
    bindings.sort();
    bindings
}

#[test]
fn test_simulate_shader_validates() {
    let module = parse_and_validate("simulate.wgsl", SIMULATE_WGSL);

    for name in ["velocity_main", "position_main"] {
        let ep = entry_point(&module, name);
        assert_eq!(ep.stage, naga::ShaderStage::Compute);
        assert_eq!(ep.workgroup_size, [WORKGROUP_SIZE, 1, 1]);
    }

    assert_eq!(bindings(&module), vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
}

#[test]
fn test_sim_uniforms_layout_matches_shader() {
    let module = parse_and_validate("simulate.wgsl", SIMULATE_WGSL);
    let (span, members) = struct_layout(&module, "SimUniforms");

    assert_eq!(span as usize, size_of::<SimUniforms>());
    assert_eq!(member_offset(&members, "softening"), offset_of!(SimUniforms, softening));
    assert_eq!(member_offset(&members, "swirl"), offset_of!(SimUniforms, swirl));
    assert_eq!(
        member_offset(&members, "velocity_damping"),
        offset_of!(SimUniforms, velocity_damping)
    );
    assert_eq!(
        member_offset(&members, "position_decay"),
        offset_of!(SimUniforms, position_decay)
    );
    assert_eq!(member_offset(&members, "grid_size"), offset_of!(SimUniforms, grid_size));
    assert_eq!(
        member_offset(&members, "attractor_count"),
        offset_of!(SimUniforms, attractor_count)
    );
    assert_eq!(member_offset(&members, "attractors"), offset_of!(SimUniforms, attractors));

    // The attractor array must hold exactly MAX_ATTRACTORS vec4s
    assert_eq!(span as usize - member_offset(&members, "attractors"), MAX_ATTRACTORS * 16);
}

#[test]
fn test_sprite_shader_validates() {
    let module = parse_and_validate("sprite.wgsl", SPRITE_WGSL);

    assert_eq!(entry_point(&module, "vs_main").stage, naga::ShaderStage::Vertex);
    assert_eq!(entry_point(&module, "fs_main").stage, naga::ShaderStage::Fragment);
    assert_eq!(bindings(&module), vec![(0, 0), (0, 1)]);
}

#[test]
fn test_sprite_uniforms_layout_matches_shader() {
    let module = parse_and_validate("sprite.wgsl", SPRITE_WGSL);
    let (span, members) = struct_layout(&module, "SpriteUniforms");

    assert_eq!(span as usize, size_of::<SpriteUniforms>());
    assert_eq!(member_offset(&members, "color"), offset_of!(SpriteUniforms, color));
    assert_eq!(member_offset(&members, "viewport"), offset_of!(SpriteUniforms, viewport));
    assert_eq!(member_offset(&members, "point_size"), offset_of!(SpriteUniforms, point_size));
    assert_eq!(member_offset(&members, "grid_size"), offset_of!(SpriteUniforms, grid_size));
    assert_eq!(
        member_offset(&members, "core_falloff"),
        offset_of!(SpriteUniforms, core_falloff)
    );
    assert_eq!(
        member_offset(&members, "glow_falloff"),
        offset_of!(SpriteUniforms, glow_falloff)
    );
    assert_eq!(member_offset(&members, "core_weight"), offset_of!(SpriteUniforms, core_weight));
    assert_eq!(member_offset(&members, "glow_weight"), offset_of!(SpriteUniforms, glow_weight));
    assert_eq!(member_offset(&members, "brightness"), offset_of!(SpriteUniforms, brightness));
    assert_eq!(member_offset(&members, "fade_slope"), offset_of!(SpriteUniforms, fade_slope));
    assert_eq!(member_offset(&members, "_padding0"), offset_of!(SpriteUniforms, _padding));
}
