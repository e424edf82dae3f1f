//! Mission upload and download over a full link

mod common;

use apo_core::mission::command::{
    CommandOptions, MAV_CMD_CONDITION_CHANGE_ALT, MAV_CMD_DO_CHANGE_SPEED, MAV_CMD_NAV_LOITER_TIME,
    MAV_CMD_NAV_WAYPOINT,
};
use apo_core::parameters::ParamValue;
use common::{home, link, replies, Gcs, Vehicle, GCS_COMPONENT, GCS_SYSTEM};
use mavlink::common::{
    MavCmd, MavFrame, MavMessage, MavMissionResult, MISSION_ACK_DATA, MISSION_CLEAR_ALL_DATA,
    MISSION_COUNT_DATA, MISSION_ITEM_DATA, MISSION_REQUEST_DATA, MISSION_REQUEST_LIST_DATA,
    MISSION_SET_CURRENT_DATA,
};

fn count(count: u16) -> MavMessage {
    MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
        count,
        target_system: 1,
        target_component: 1,
        ..Default::default()
    })
}

fn waypoint(seq: u16, north_m: f32) -> MavMessage {
    MavMessage::MISSION_ITEM(MISSION_ITEM_DATA {
        seq,
        frame: MavFrame::MAV_FRAME_LOCAL_NED,
        command: MavCmd::MAV_CMD_NAV_WAYPOINT,
        x: north_m,
        y: 0.0,
        z: -5.0,
        param2: 3.0,
        target_system: 1,
        target_component: 1,
        autocontinue: 1,
        ..Default::default()
    })
}

fn request(seq: u16) -> MavMessage {
    MavMessage::MISSION_REQUEST(MISSION_REQUEST_DATA {
        seq,
        target_system: 1,
        target_component: 1,
        ..Default::default()
    })
}

#[test]
fn test_upload_in_order_completes() {
    let mut vehicle = Vehicle::new();
    let mut link = link();
    let mut gcs = Gcs::new();

    gcs.send(link.channel_mut(), count(5));
    link.receive(&mut vehicle.context(0));
    let out = replies(link.channel_mut());
    assert!(matches!(out[0].1, MavMessage::MISSION_REQUEST(ref d) if d.seq == 0));

    for seq in 0..5 {
        gcs.send(link.channel_mut(), waypoint(seq, 10.0 * seq as f32));
        link.receive(&mut vehicle.context(1_000 * seq as u64));
    }

    let out = replies(link.channel_mut());
    let (header, last) = out.last().expect("reply");
    assert_eq!(header.system_id, 1);
    assert!(matches!(last, MavMessage::MISSION_ACK(d)
        if d.mavtype == MavMissionResult::MAV_MISSION_ACCEPTED
            && d.target_system == GCS_SYSTEM
            && d.target_component == GCS_COMPONENT));
    assert!(!link.mission().is_receiving());

    assert_eq!(vehicle.mission.command_count(), 4);
    assert_eq!(vehicle.mission.home(), &home());
    let fourth = vehicle.mission.get(4).expect("command 4");
    assert_eq!(fourth.id, MAV_CMD_NAV_WAYPOINT);
    assert!(fourth.options.contains(CommandOptions::RELATIVE_ALT));
    assert_eq!(fourth.alt, home().alt + 500);
    assert!(fourth.lat > home().lat);
    assert_eq!(fourth.radius(), 3.0);
    assert_eq!(vehicle.params.get("CMD_TOTAL"), Some(&ParamValue::Int16(4)));
}

#[test]
fn test_out_of_order_item_is_dropped() {
    let mut vehicle = Vehicle::new();
    let mut link = link();
    let mut gcs = Gcs::new();

    gcs.send(link.channel_mut(), count(5));
    gcs.send(link.channel_mut(), waypoint(0, 0.0));
    gcs.send(link.channel_mut(), waypoint(2, 20.0));
    link.receive(&mut vehicle.context(0));

    let out = replies(link.channel_mut());
    let seqs: Vec<u16> = out
        .iter()
        .filter_map(|(_, m)| match m {
            MavMessage::MISSION_REQUEST(d) => Some(d.seq),
            _ => None,
        })
        .collect();
    assert_eq!(seqs, vec![0, 1]);
    assert!(link.mission().is_receiving());
    assert_eq!(vehicle.mission.get(2), Some(vehicle.mission.home()));

    // periodic re-request of the expected item
    link.request_commands();
    let out = replies(link.channel_mut());
    assert!(matches!(out[0].1, MavMessage::MISSION_REQUEST(ref d) if d.seq == 1));
}

#[test]
fn test_download_returns_uploaded_mission() {
    let mut vehicle = Vehicle::new();
    let mut link = link();
    let mut gcs = Gcs::new();

    gcs.send(link.channel_mut(), count(3));
    gcs.send(link.channel_mut(), waypoint(0, 0.0));
    gcs.send(link.channel_mut(), waypoint(1, 50.0));
    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_ITEM(MISSION_ITEM_DATA {
            seq: 2,
            frame: MavFrame::MAV_FRAME_MISSION,
            command: MavCmd::MAV_CMD_DO_CHANGE_SPEED,
            param2: 2.5,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    link.receive(&mut vehicle.context(0));
    replies(link.channel_mut());
    assert_eq!(vehicle.mission.get(2).map(|c| c.id), Some(MAV_CMD_DO_CHANGE_SPEED));

    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_REQUEST_LIST(MISSION_REQUEST_LIST_DATA {
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    gcs.send(link.channel_mut(), request(1));
    gcs.send(link.channel_mut(), request(2));
    link.receive(&mut vehicle.context(0));
    assert!(link.mission().is_sending());

    let out = replies(link.channel_mut());
    assert!(matches!(out[0].1, MavMessage::MISSION_COUNT(ref d) if d.count == 3));
    let MavMessage::MISSION_ITEM(ref wp) = out[1].1 else {
        panic!("expected MISSION_ITEM");
    };
    assert_eq!(wp.seq, 1);
    assert_eq!(wp.frame, MavFrame::MAV_FRAME_GLOBAL_RELATIVE_ALT);
    assert!((wp.z - 5.0).abs() < 0.01);
    let MavMessage::MISSION_ITEM(ref speed) = out[2].1 else {
        panic!("expected MISSION_ITEM");
    };
    assert_eq!(speed.command, MavCmd::MAV_CMD_DO_CHANGE_SPEED);
    assert_eq!(speed.param2, 2.5);

    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_ACK(MISSION_ACK_DATA {
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    link.receive(&mut vehicle.context(0));
    assert!(!link.mission().is_sending());
}

#[test]
fn test_clear_all_and_set_current() {
    let mut vehicle = Vehicle::new();
    let mut link = link();
    let mut gcs = Gcs::new();

    gcs.send(link.channel_mut(), count(3));
    for seq in 0..3 {
        gcs.send(link.channel_mut(), waypoint(seq, 30.0 * seq as f32));
    }
    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_SET_CURRENT(MISSION_SET_CURRENT_DATA {
            seq: 2,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    link.receive(&mut vehicle.context(0));
    let out = replies(link.channel_mut());
    assert!(matches!(out.last().map(|(_, m)| m), Some(MavMessage::MISSION_CURRENT(d)) if d.seq == 2));
    assert_eq!(vehicle.guide.cmd_index(), 2);

    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_CLEAR_ALL(MISSION_CLEAR_ALL_DATA {
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    link.receive(&mut vehicle.context(0));
    let acks = replies(link.channel_mut())
        .into_iter()
        .filter(|(_, m)| matches!(m, MavMessage::MISSION_ACK(_)))
        .count();
    assert_eq!(acks, 3);
    assert_eq!(vehicle.mission.command_count(), 0);
    assert_eq!(vehicle.guide.cmd_index(), 0);
}

#[test]
fn test_upload_for_other_system_ignored() {
    let mut vehicle = Vehicle::new();
    let mut link = link();
    let mut gcs = Gcs::new();

    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
            count: 4,
            target_system: 2,
            target_component: 1,
            ..Default::default()
        }),
    );
    link.receive(&mut vehicle.context(0));

    assert!(replies(link.channel_mut()).is_empty());
    assert!(!link.mission().is_receiving());
    assert_eq!(vehicle.params.get("CMD_TOTAL"), Some(&ParamValue::Int16(0)));
}

/// Upload `command` as the only mission item, then download it again
fn round_trip(command: MavCmd, params: [f32; 4]) -> (Vehicle, MISSION_ITEM_DATA) {
    let mut vehicle = Vehicle::new();
    let mut link = link();
    let mut gcs = Gcs::new();
    let [param1, param2, param3, param4] = params;

    gcs.send(link.channel_mut(), count(2));
    gcs.send(link.channel_mut(), waypoint(0, 0.0));
    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_ITEM(MISSION_ITEM_DATA {
            seq: 1,
            frame: MavFrame::MAV_FRAME_MISSION,
            command,
            param1,
            param2,
            param3,
            param4,
            target_system: 1,
            target_component: 1,
            autocontinue: 1,
            ..Default::default()
        }),
    );
    link.receive(&mut vehicle.context(0));
    replies(link.channel_mut());
    assert_eq!(vehicle.mission.get(1).map(|c| c.id), Some(command as u16));

    gcs.send(
        link.channel_mut(),
        MavMessage::MISSION_REQUEST_LIST(MISSION_REQUEST_LIST_DATA {
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    gcs.send(link.channel_mut(), request(1));
    link.receive(&mut vehicle.context(0));

    let item = replies(link.channel_mut())
        .into_iter()
        .find_map(|(_, m)| match m {
            MavMessage::MISSION_ITEM(d) => Some(d),
            _ => None,
        })
        .expect("MISSION_ITEM");
    (vehicle, item)
}

#[test]
fn test_every_command_kind_round_trips() {
    let table: [(MavCmd, [f32; 4]); 15] = [
        (MavCmd::MAV_CMD_NAV_LOITER_TURNS, [3.0, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_NAV_TAKEOFF, [15.0, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_NAV_LOITER_TIME, [60.0, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_DO_SET_HOME, [1.0, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_CONDITION_CHANGE_ALT, [2.5, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_CONDITION_DELAY, [12.0, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_CONDITION_DISTANCE, [40.0, 0.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_DO_JUMP, [2.0, 5.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_DO_REPEAT_SERVO, [5.0, 1500.0, 3.0, 2.0]),
        (MavCmd::MAV_CMD_DO_REPEAT_RELAY, [1.0, 4.0, 30.0, 0.0]),
        (MavCmd::MAV_CMD_DO_CHANGE_SPEED, [1.0, 2.5, 50.0, 0.0]),
        (MavCmd::MAV_CMD_DO_SET_PARAMETER, [3.0, 7.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_DO_SET_RELAY, [0.0, 1.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_DO_SET_SERVO, [8.0, 1900.0, 0.0, 0.0]),
        (MavCmd::MAV_CMD_CONDITION_YAW, [90.0, 10.0, 1.0, 0.0]),
    ];

    for (command, params) in table {
        let (vehicle, item) = round_trip(command, params);
        assert_eq!(item.command, command, "{command:?}");
        assert_eq!(
            [item.param1, item.param2, item.param3, item.param4],
            params,
            "{command:?}"
        );

        let stored = vehicle.mission.get(1).expect("stored command");
        match stored.id {
            MAV_CMD_CONDITION_CHANGE_ALT => assert_eq!(stored.p1, 250.0),
            MAV_CMD_NAV_LOITER_TIME => assert_eq!(stored.p1, 6.0),
            MAV_CMD_DO_CHANGE_SPEED => assert_eq!(stored.p2, 2.5),
            _ => {}
        }
    }
}
