//! Byte-exact fixtures pinning the on-wire layout for both pointer-width
//! dialects.
use hexlit::hex;
use pretty_assertions::assert_eq;

use aep::model::{Project, Texture};
use aep::{decode_binary, encode_binary, Architecture};

fn empty_project() -> Project {
    Project::new(Vec::new(), Vec::new()).unwrap()
}

#[test]
fn empty_project_x86_is_byte_exact() {
    let bytes = encode_binary(&empty_project(), Architecture::X86).unwrap();
    assert_eq!(
        hex!(
            00000000 00000000 00000000 00000000
            20000000
            000000000000000000000000
        )
        .to_vec(),
        bytes
    );
}

#[test]
fn empty_project_x64_is_byte_exact() {
    let bytes = encode_binary(&empty_project(), Architecture::X64).unwrap();
    assert_eq!(
        hex!(
            00000000 00000000 00000000 00000000
            2000000000000000
            0000000000000000
        )
        .to_vec(),
        bytes
    );
}

#[test]
fn empty_project_round_trips_both_architectures() {
    for arch in [Architecture::X86, Architecture::X64] {
        let project = empty_project();
        let bytes = encode_binary(&project, arch).unwrap();
        let decoded = decode_binary(&bytes, arch).unwrap();
        assert_eq!(decoded, project);
    }
}

#[test]
fn single_texture_x86_is_byte_exact() {
    let project = Project::new(
        vec![Texture {
            name: "t".to_string(),
            width: 10,
            height: 20,
        }],
        Vec::new(),
    )
    .unwrap();

    let bytes = encode_binary(&project, Architecture::X86).unwrap();

    assert_eq!(
        hex!(
            1400 0000 34000000 0a00 1400 00000000 00000000
            00000000 00000000 00000000 00000000
            34000000
            000000000000 000000000000
            7400
        )
        .to_vec(),
        bytes
    );

    let decoded = decode_binary(&bytes, Architecture::X86).unwrap();
    assert_eq!(decoded, project);
}

#[test]
fn single_texture_round_trips_x64() {
    let project = Project::new(
        vec![Texture {
            name: "diffuse".to_string(),
            width: 512,
            height: 256,
        }],
        Vec::new(),
    )
    .unwrap();

    let bytes = encode_binary(&project, Architecture::X64).unwrap();
    let decoded = decode_binary(&bytes, Architecture::X64).unwrap();
    assert_eq!(decoded, project);
}
