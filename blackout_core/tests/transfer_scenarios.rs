//! End-to-end transfer scenarios driven through the `Blackout` facade.

use blackout_core::{Blackout, EntityKind, Outcome, TransferError, RADIUS_OF_JUPITER};
use EntityKind::*;

const ORBIT: f64 = RADIUS_OF_JUPITER + 10_000.0;

#[test]
fn test_second_file_exceeds_receive_quota() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 10.0).unwrap();
    world.create_satellite("s1", StandardSatellite, ORBIT, 10.0).unwrap();
    world.add_file_to_device("d1", "a", "first");
    world.add_file_to_device("d1", "b", "second");

    world.send_file("a", "d1", "s1").unwrap();
    assert_eq!(
        world.send_file("b", "d1", "s1"),
        Err(TransferError::NoBandwidth("b".into()))
    );
    assert_eq!(world.transfers().len(), 1);
}

#[test]
fn test_standard_satellite_caps_file_count() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 10.0).unwrap();
    world.create_satellite("s1", StandardSatellite, ORBIT, 20.0).unwrap();
    for name in ["a", "b", "c", "d"] {
        world.add_file_to_device("d1", name, "xy");
    }

    for name in ["a", "b", "c"] {
        world.send_file(name, "d1", "s1").unwrap();
        world.simulate_for(2);
        assert!(world.get_info("s1").unwrap().files[name].is_complete);
    }

    // 6 bytes stored, far below 80, but three files is the ceiling
    assert_eq!(
        world.send_file("d", "d1", "s1"),
        Err(TransferError::NoStorageSpace("Max Files Reached".into()))
    );
}

#[test]
fn test_standard_satellite_caps_bytes() {
    let mut world = Blackout::new();
    world.create_device("d1", LaptopDevice, 10.0).unwrap();
    world.create_satellite("s1", StandardSatellite, ORBIT, 10.0).unwrap();
    world.add_file_to_device("d1", "big", &"x".repeat(81));

    assert_eq!(
        world.send_file("big", "d1", "s1"),
        Err(TransferError::NoStorageSpace("Max Storage Reached".into()))
    );
    assert!(world.get_info("s1").unwrap().files.is_empty());
}

#[test]
fn test_three_files_share_teleporting_link() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 40.0).unwrap();
    world.create_satellite("t1", TeleportingSatellite, ORBIT, 40.0).unwrap();
    for name in ["a", "b", "c"] {
        world.add_file_to_device("d1", name, "0123456789");
        world.send_file(name, "d1", "t1").unwrap();
    }

    world.simulate();
    let info = world.get_info("t1").unwrap();
    for name in ["a", "b", "c"] {
        assert_eq!(info.files[name].data, "01234");
        assert!(!info.files[name].is_complete);
    }
    assert!(world
        .last_events()
        .iter()
        .all(|e| e.outcome == Outcome::Progressed { ration: 5 }));

    world.simulate();
    let info = world.get_info("t1").unwrap();
    for name in ["a", "b", "c"] {
        assert_eq!(info.files[name].data, "0123456789");
        assert!(info.files[name].is_complete);
    }
    assert!(world.transfers().is_empty());
}

#[test]
fn test_single_file_uses_full_bandwidth() {
    let mut world = Blackout::new();
    world.create_satellite("t1", TeleportingSatellite, ORBIT, 40.0).unwrap();
    world.create_device("d1", DesktopDevice, 40.0).unwrap();
    world.add_file_to_device("d1", "f", &"z".repeat(30));
    world.send_file("f", "d1", "t1").unwrap();
    world.simulate();

    world.create_device("d2", LaptopDevice, 40.0).unwrap();
    world.simulate();
    let info = world.get_info("t1").unwrap();
    assert!(info.files["f"].is_complete);

    // Teleporting satellites send at 10 bytes per tick
    world.send_file("f", "t1", "d2").unwrap();
    world.simulate();
    assert_eq!(world.get_info("d2").unwrap().files["f"].data.len(), 10);
}

#[test]
fn test_teleport_mid_transfer_strips_source() {
    let content = "The teleporting satellite takes this text";
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 180.0).unwrap();
    world.create_satellite("t1", TeleportingSatellite, ORBIT, 179.0).unwrap();
    world.add_file_to_device("d1", "f", content);
    world.send_file("f", "d1", "t1").unwrap();

    world.simulate();
    assert_eq!(world.get_info("t1").unwrap().files["f"].data.len(), 15);

    world.simulate();
    assert_eq!(world.get_info("t1").unwrap().position, 0.0);
    assert_eq!(world.last_events()[0].outcome, Outcome::SourceCorrupted);

    let stripped: String = content.chars().filter(|c| !matches!(c, 't' | 'T')).collect();
    let source = &world.get_info("d1").unwrap().files["f"];
    assert_eq!(source.data, stripped);
    assert_eq!(source.size, stripped.len());
    assert!(source.is_complete);
    assert!(world.get_info("t1").unwrap().files.is_empty());
    assert!(world.transfers().is_empty());
}

#[test]
fn test_completed_transfer_round_trips_content() {
    let content = "Round trip content survives intact";
    let mut world = Blackout::new();
    world.create_device("d1", LaptopDevice, 90.0).unwrap();
    world.create_satellite("t1", TeleportingSatellite, ORBIT, 90.0).unwrap();
    world.add_file_to_device("d1", "f", content);
    world.send_file("f", "d1", "t1").unwrap();

    world.simulate_for(3);
    let delivered = &world.get_info("t1").unwrap().files["f"];
    assert_eq!(delivered.data, content);
    assert!(delivered.is_complete);
}

#[test]
fn test_relay_carries_transfer_to_hidden_satellite() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 140.0).unwrap();
    world.create_satellite("r1", RelaySatellite, ORBIT, 160.0).unwrap();
    world.create_satellite("s2", StandardSatellite, ORBIT, 190.0).unwrap();
    world.add_file_to_device("d1", "f", "x");

    assert!(world.communicable_entities_in_range("d1").contains(&"s2".to_string()));
    world.send_file("f", "d1", "s2").unwrap();
    world.simulate();

    assert!(world.get_info("s2").unwrap().files["f"].is_complete);
    assert!(world.get_info("r1").unwrap().files.is_empty());
}

#[test]
fn test_relay_is_never_a_destination() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 150.0).unwrap();
    world.create_satellite("r1", RelaySatellite, ORBIT, 150.0).unwrap();
    world.add_file_to_device("d1", "f", "data");

    assert_eq!(
        world.send_file("f", "d1", "r1"),
        Err(TransferError::NoBandwidth("f".into()))
    );
}

#[test]
fn test_describe_is_idempotent() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 10.0).unwrap();
    world.create_satellite("t1", TeleportingSatellite, ORBIT, 10.0).unwrap();
    world.add_file_to_device("d1", "f", &"q".repeat(30));
    world.send_file("f", "d1", "t1").unwrap();
    world.simulate();

    assert_eq!(world.get_info("t1"), world.get_info("t1"));
    assert_eq!(world.get_info("d1"), world.get_info("d1"));
}

#[test]
fn test_teleport_on_first_tick_strips_source() {
    let content = "The two twenty two train tore through the tunnel";
    let mut world = Blackout::new();
    world.create_device("d1", LaptopDevice, 180.0).unwrap();
    world.create_satellite("t1", TeleportingSatellite, ORBIT, 179.9).unwrap();
    world.add_file_to_device("d1", "f", content);
    world.send_file("f", "d1", "t1").unwrap();

    world.simulate();
    assert_eq!(world.get_info("t1").unwrap().position, 0.0);
    assert_eq!(world.last_events()[0].outcome, Outcome::SourceCorrupted);

    let stripped: String = content.chars().filter(|c| !matches!(c, 't' | 'T')).collect();
    let source = &world.get_info("d1").unwrap().files["f"];
    assert_eq!(source.data, stripped);
    assert!(source.is_complete);
    assert!(world.get_info("t1").unwrap().files.is_empty());
    assert!(world.transfers().is_empty());
}

#[test]
fn test_link_lost_on_first_tick_drops_file() {
    let mut world = Blackout::new();
    world.create_device("d1", HandheldDevice, 0.0).unwrap();
    world.create_satellite("s1", StandardSatellite, ORBIT, 332.5).unwrap();
    world.add_file_to_device("d1", "f", "payload");
    assert_eq!(world.communicable_entities_in_range("d1"), vec!["s1"]);
    world.send_file("f", "d1", "s1").unwrap();

    world.simulate();
    assert!(world.communicable_entities_in_range("d1").is_empty());
    assert_eq!(world.last_events()[0].outcome, Outcome::Dropped);
    assert!(world.get_info("d1").unwrap().files.is_empty());
    assert!(world.get_info("s1").unwrap().files.is_empty());
    assert!(world.transfers().is_empty());
}

#[test]
fn test_teleport_mid_download_patches_device_copy() {
    let content = "The two twenty two train tore through the tunnel";
    let mut world = Blackout::new();
    world.create_satellite("sat", TeleportingSatellite, ORBIT, 0.0).unwrap();
    world.create_device("send", LaptopDevice, 0.0).unwrap();
    world.create_device("receive", LaptopDevice, 180.0).unwrap();
    world.add_file_to_device("send", "1", content);
    world.send_file("1", "send", "sat").unwrap();

    world.simulate_for(250);
    let uploaded = &world.get_info("sat").unwrap().files["1"];
    assert_eq!(uploaded.data, content);
    assert!(uploaded.is_complete);

    world.send_file("1", "sat", "receive").unwrap();
    world.simulate();
    let partial = &world.get_info("receive").unwrap().files["1"];
    assert_eq!(partial.data, "The two tw");
    assert_eq!(partial.size, 48);
    assert!(!partial.is_complete);

    world.simulate();
    assert_eq!(world.get_info("sat").unwrap().position, 0.0);
    assert_eq!(world.last_events()[0].outcome, Outcome::PartialDelivered);

    let patched = &world.get_info("receive").unwrap().files["1"];
    assert_eq!(patched.data, "The two tweny wo rain ore hrough he unnel");
    assert_eq!(patched.size, 41);
    assert!(patched.is_complete);
}
