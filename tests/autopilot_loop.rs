//! Full-loop behavior: ground station, guidance and control together

mod common;

use apo::platform::mock::{MemoryStorage, MockRangeFinder, MockRcChannel, MockSerial};
use apo::rover::{Autopilot, AutopilotConfig, RoverChannels};
use apo_core::control::ControlMode;
use apo_core::hal::{Orientation, RcChannel};
use apo_core::navigation::{HilNavigator, NavState};
use apo_core::traits::MockTime;
use common::{home, replies, Gcs};
use mavlink::common::{
    MavCmd, MavFrame, MavMessage, MavResult, COMMAND_LONG_DATA, GPS_RAW_INT_DATA, MISSION_COUNT_DATA,
    MISSION_ITEM_DATA,
};

type Rover = Autopilot<HilNavigator, MockRcChannel, MockRangeFinder, MemoryStorage, MockSerial>;

const STEP_US: u64 = 20_000;

fn rover(mode_radio: u16) -> Rover {
    let config = AutopilotConfig {
        home: home(),
        ..AutopilotConfig::default()
    };
    let channels = RoverChannels {
        mode: MockRcChannel::new(mode_radio),
        steering: MockRcChannel::new(1500),
        throttle: MockRcChannel::new(1500),
    };
    let finders = vec![
        MockRangeFinder::new(Orientation::FRONT, 10.0),
        MockRangeFinder::new(Orientation::BACK, 10.0),
    ];
    let mut rover = Autopilot::new(
        config,
        HilNavigator::new(NavState {
            lat: home().lat,
            lon: home().lng,
            alt_mm: home().alt * 10,
            ..NavState::default()
        }),
        channels,
        finders,
        MemoryStorage::new(),
    )
    .expect("autopilot");
    assert!(rover.add_link(MockSerial::new()));
    rover
}

fn serial(rover: &mut Rover) -> &mut MockSerial {
    rover.link_mut(0).expect("link").channel_mut()
}

/// Upload waypoints given as (north, east) metres from home
fn upload(rover: &mut Rover, gcs: &mut Gcs, legs: &[(f32, f32)], now_us: u64) {
    gcs.send(
        serial(rover),
        MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
            count: legs.len() as u16 + 1,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    let items = std::iter::once((0.0, 0.0)).chain(legs.iter().copied());
    for (seq, (north, east)) in items.enumerate() {
        gcs.send(
            serial(rover),
            MavMessage::MISSION_ITEM(MISSION_ITEM_DATA {
                seq: seq as u16,
                frame: MavFrame::MAV_FRAME_LOCAL_NED,
                command: MavCmd::MAV_CMD_NAV_WAYPOINT,
                x: north,
                y: east,
                param2: 2.0,
                target_system: 1,
                target_component: 1,
                ..Default::default()
            }),
        );
    }
    rover.step(now_us);
}

fn gps_at(north_m: f64, east_m: f64) -> GPS_RAW_INT_DATA {
    let (lat, lon) = apo_core::geo::offset_ned(home().lat_rad(), home().lng_rad(), north_m, east_m);
    GPS_RAW_INT_DATA {
        lat: apo_core::geo::rad_to_deg_int(lat),
        lon: apo_core::geo::rad_to_deg_int(lon),
        alt: home().alt * 10,
        vel: 0,
        cog: u16::MAX,
        ..Default::default()
    }
}

#[test]
fn test_heartbeat_reports_auto_mode() {
    let mut rover = rover(1100);
    rover.step(0);
    let out = replies(serial(&mut rover));
    assert!(out.iter().any(|(h, m)| h.system_id == 1
        && matches!(m, MavMessage::HEARTBEAT(d) if d.custom_mode == 10)));
}

#[test]
fn test_uploaded_mission_steers_rover() {
    let mut rover = rover(1100);
    let mut gcs = Gcs::new();
    upload(&mut rover, &mut gcs, &[(0.0, 100.0), (100.0, 100.0)], 0);
    assert_eq!(rover.mission().command_count(), 2);

    // restart the mission now that it has commands
    gcs.send(
        serial(&mut rover),
        MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            command: MavCmd::MAV_CMD_MISSION_START,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    let time = MockTime::with_initial(STEP_US);
    for _ in 0..10 {
        rover.run_once(&time);
        time.advance(STEP_US);
    }

    assert_eq!(rover.guide().cmd_index(), 1);
    // first leg runs due east
    let heading = rover.setpoint().heading;
    assert!((heading - core::f32::consts::FRAC_PI_2).abs() < 0.01);
    assert_eq!(rover.mode(), ControlMode::Auto);
    // vehicle faces north, so it steers right and accelerates
    assert!(rover.channels().steering.position() > 0.5);
    assert!(rover.channels().throttle.position() > 0.0);
}

#[test]
fn test_reaching_waypoint_advances_guide() {
    let mut rover = rover(1100);
    let mut gcs = Gcs::new();
    upload(&mut rover, &mut gcs, &[(0.0, 100.0), (100.0, 100.0)], 0);
    gcs.send(
        serial(&mut rover),
        MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            command: MavCmd::MAV_CMD_MISSION_START,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    rover.step(STEP_US);

    gcs.send(
        serial(&mut rover),
        MavMessage::GPS_RAW_INT(gps_at(0.0, 99.5)),
    );
    let mut now = 2 * STEP_US;
    for _ in 0..10 {
        rover.step(now);
        now += STEP_US;
    }
    assert_eq!(rover.guide().cmd_index(), 2);
    // second leg runs due north
    assert!(rover.setpoint().heading.abs() < 0.01);
}

#[test]
fn test_manual_mode_from_ground_station() {
    let mut rover = rover(1100);
    let mut gcs = Gcs::new();
    rover.step(0);
    assert_eq!(rover.mode(), ControlMode::Auto);

    gcs.send(
        serial(&mut rover),
        MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            command: MavCmd::MAV_CMD_DO_SET_MODE,
            param1: 1.0,
            param2: 0.0,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    rover.channels_mut().steering.set_radio(1700);
    let mut now = STEP_US;
    for _ in 0..3 {
        rover.step(now);
        now += STEP_US;
    }

    assert_eq!(rover.mode(), ControlMode::Manual);
    assert_eq!(rover.channels().steering.pwm(), 1700);
    let out = replies(serial(&mut rover));
    assert!(out
        .iter()
        .any(|(_, m)| matches!(m, MavMessage::COMMAND_ACK(d) if d.command == MavCmd::MAV_CMD_DO_SET_MODE)));
}

#[test]
fn test_rc_manual_switch_refuses_auto() {
    let mut rover = rover(1900);
    let mut gcs = Gcs::new();
    rover.step(0);
    assert_eq!(rover.mode(), ControlMode::Manual);
    replies(serial(&mut rover));

    gcs.send(
        serial(&mut rover),
        MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            command: MavCmd::MAV_CMD_DO_SET_MODE,
            param1: 1.0,
            param2: 10.0,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    rover.step(STEP_US);

    let out = replies(serial(&mut rover));
    assert!(out.iter().any(|(_, m)| matches!(m, MavMessage::COMMAND_ACK(d)
        if d.command == MavCmd::MAV_CMD_DO_SET_MODE
            && d.result == MavResult::MAV_RESULT_TEMPORARILY_REJECTED)));
    assert_eq!(rover.mode(), ControlMode::Manual);
}

#[test]
fn test_obstacle_zeroes_speed_without_latching() {
    let mut rover = rover(1100);
    rover.range_finders_mut()[1].set_distance(0.2);
    rover.step(0);
    assert_eq!(rover.setpoint().ground_speed, 0.0);

    rover.range_finders_mut()[1].set_distance(4.0);
    rover.step(100_000);
    assert!(rover.setpoint().ground_speed > 0.0);
}

#[test]
fn test_stalled_upload_times_out() {
    let mut rover = rover(1100);
    let mut gcs = Gcs::new();
    gcs.send(
        serial(&mut rover),
        MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
            count: 4,
            target_system: 1,
            target_component: 1,
            ..Default::default()
        }),
    );
    rover.step(0);
    assert!(rover.links()[0].mission().is_receiving());

    rover.step(1_000_000);
    assert!(rover.links()[0].mission().is_receiving());
    rover.step(6_000_000);
    assert!(!rover.links()[0].mission().is_receiving());
}
