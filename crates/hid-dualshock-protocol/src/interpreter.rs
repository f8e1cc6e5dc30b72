//! DualShock 4 raw-report interpretation and feedback encoding.

use crate::report::{
    ACC_RANGE, FEATURE_REPORT_CALIBRATION, FEATURE_REPORT_CALIBRATION_SIZE,
    FEATURE_REPORT_FIRMWARE_VERSION, FEATURE_REPORT_FIRMWARE_VERSION_SIZE, GYRO_RANGE,
    GYRO_RES_PER_DEG_S, INPUT_REPORT_FULL, INPUT_REPORT_FULL_LEN, INPUT_REPORT_SIMPLE,
    INPUT_REPORT_SIMPLE_LEN, STATUS_BATTERY_CAPACITY, encode_output_report,
};
use openpad_controller_types::{
    BUTTON_A, BUTTON_B, BUTTON_SHOULDER_L, BUTTON_SHOULDER_R, BUTTON_THUMB_L, BUTTON_THUMB_R,
    BUTTON_TRIGGER_L, BUTTON_TRIGGER_R, BUTTON_X, BUTTON_Y, Controller, ControllerClass, Gamepad,
    MISC_BUTTON_SELECT, MISC_BUTTON_START, MISC_BUTTON_SYSTEM,
};
use openpad_hid_common::report::transaction;
use openpad_hid_common::{HAT_NULL, OutgoingReport, hat_to_dpad};
use tracing::{info, warn};

/// Per-axis sensor calibration: `out = sens_numer * (raw - bias) / sens_denom`.
#[derive(Debug, Clone, Copy)]
struct CalibrationData {
    bias: i16,
    sens_numer: i32,
    sens_denom: i32,
}

impl CalibrationData {
    fn identity(range: i32) -> Self {
        Self {
            bias: 0,
            sens_numer: range,
            sens_denom: i32::from(i16::MAX),
        }
    }

    fn apply(&self, raw: i16) -> i32 {
        let numer = i64::from(self.sens_numer);
        let value = i64::from(raw) - i64::from(self.bias);
        (numer * value / i64::from(self.sens_denom)) as i32
    }
}

/// Per-device DualShock 4 state.
///
/// The remembered lightbar color and rumble strength exist because the
/// output report always carries both: sending a color must not stop the
/// motors and vice versa.
#[derive(Debug, Clone, Copy)]
pub struct Ds4Interpreter {
    fw_version: u16,
    hw_version: u16,

    gyro_calib: [CalibrationData; 3],
    accel_calib: [CalibrationData; 3],

    prev_color_red: u8,
    prev_color_green: u8,
    prev_color_blue: u8,
    prev_rumble: u8,
}

impl Default for Ds4Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Ds4Interpreter {
    pub fn new() -> Self {
        Self {
            fw_version: 0,
            hw_version: 0,
            gyro_calib: [CalibrationData::identity(GYRO_RANGE); 3],
            accel_calib: [CalibrationData::identity(ACC_RANGE); 3],
            prev_color_red: 0,
            prev_color_green: 0,
            prev_color_blue: 0,
            prev_rumble: 0,
        }
    }

    pub fn versions(&self) -> (u16, u16) {
        (self.fw_version, self.hw_version)
    }

    /// Reports to send right after the connection is ready, in order:
    /// enable the lightbar (switches most devices to report 0x11), then
    /// request the calibration feature report (switches the rest).
    pub fn setup(&mut self) -> Vec<OutgoingReport> {
        self.prev_color_red = 0x00;
        self.prev_color_green = 0x00;
        self.prev_color_blue = 0x40; // default: blue
        self.prev_rumble = 0x00;

        vec![
            self.output_report(),
            OutgoingReport::control(vec![transaction::GET_FEATURE, FEATURE_REPORT_CALIBRATION]),
        ]
    }

    pub fn init_report(&mut self, ctl: &mut Controller) {
        ctl.reset_as(ControllerClass::Gamepad);
    }

    pub fn parse_raw_report(&mut self, ctl: &mut Controller, report: &[u8]) {
        match (report.first().copied(), report.len()) {
            (Some(INPUT_REPORT_FULL), INPUT_REPORT_FULL_LEN) => {
                self.parse_report_full(ctl, &report[3..])
            }
            (Some(INPUT_REPORT_SIMPLE), INPUT_REPORT_SIMPLE_LEN) => {
                Self::parse_report_simple(ctl, &report[1..])
            }
            (id, len) => warn!(?id, len, "DS4: unexpected report type or length"),
        }
    }

    /// Axes, hat and buttons shared by both input report layouts.
    fn parse_sticks_and_buttons(gp: &mut Gamepad, data: &[u8]) {
        gp.axis_x = recenter(data[0]);
        gp.axis_y = recenter(data[1]);
        gp.axis_rx = recenter(data[2]);
        gp.axis_ry = recenter(data[3]);

        let hat = match data[4] & 0x0f {
            v if v > 7 => HAT_NULL,
            v => v,
        };
        gp.dpad = hat_to_dpad(hat);

        if data[4] & 0x10 != 0 {
            gp.buttons |= BUTTON_X; // west
        }
        if data[4] & 0x20 != 0 {
            gp.buttons |= BUTTON_A; // south
        }
        if data[4] & 0x40 != 0 {
            gp.buttons |= BUTTON_B; // east
        }
        if data[4] & 0x80 != 0 {
            gp.buttons |= BUTTON_Y; // north
        }
        if data[5] & 0x01 != 0 {
            gp.buttons |= BUTTON_SHOULDER_L; // L1
        }
        if data[5] & 0x02 != 0 {
            gp.buttons |= BUTTON_SHOULDER_R; // R1
        }
        if data[5] & 0x04 != 0 {
            gp.buttons |= BUTTON_TRIGGER_L; // L2
        }
        if data[5] & 0x08 != 0 {
            gp.buttons |= BUTTON_TRIGGER_R; // R2
        }
        if data[5] & 0x10 != 0 {
            gp.misc_buttons |= MISC_BUTTON_SELECT; // share
        }
        if data[5] & 0x20 != 0 {
            gp.misc_buttons |= MISC_BUTTON_START; // options
        }
        if data[5] & 0x40 != 0 {
            gp.buttons |= BUTTON_THUMB_L;
        }
        if data[5] & 0x80 != 0 {
            gp.buttons |= BUTTON_THUMB_R;
        }
        if data[6] & 0x01 != 0 {
            gp.misc_buttons |= MISC_BUTTON_SYSTEM; // PS
        }

        gp.brake = i32::from(data[7]) * 4;
        gp.throttle = i32::from(data[8]) * 4;
    }

    fn parse_report_simple(ctl: &mut Controller, data: &[u8]) {
        Self::parse_sticks_and_buttons(ctl.gamepad_mut(), data);
    }

    fn parse_report_full(&self, ctl: &mut Controller, data: &[u8]) {
        let gp = ctl.gamepad_mut();
        Self::parse_sticks_and_buttons(gp, data);

        // Motion sensors: timestamp u16 + temperature at 9..11, then
        // gyro and accel as little-endian i16 triples.
        for (i, calib) in self.gyro_calib.iter().enumerate() {
            let raw = i16::from_le_bytes([data[12 + 2 * i], data[13 + 2 * i]]);
            gp.gyro[i] = calib.apply(raw);
        }
        for (i, calib) in self.accel_calib.iter().enumerate() {
            let raw = i16::from_le_bytes([data[18 + 2 * i], data[19 + 2 * i]]);
            gp.accel[i] = calib.apply(raw);
        }

        // Capacity nibble goes 0..10; scale to 0..250 and add one so a
        // reported zero is distinguishable from "battery unavailable".
        let capacity = data[29] & STATUS_BATTERY_CAPACITY;
        ctl.battery = capacity.min(10) * 25 + 1;
    }

    /// Calibration and firmware-version feature reports. The calibration
    /// response triggers the firmware-version request, which is returned
    /// to the caller for transmission.
    pub fn parse_feature_report(&mut self, report: &[u8]) -> Option<OutgoingReport> {
        match report.first().copied() {
            Some(FEATURE_REPORT_CALIBRATION) => {
                if report.len() != FEATURE_REPORT_CALIBRATION_SIZE {
                    warn!(
                        len = report.len(),
                        want = FEATURE_REPORT_CALIBRATION_SIZE,
                        "DS4: unexpected calibration report size"
                    );
                    return None;
                }
                info!("DS4: calibration report received");
                self.apply_calibration(report);
                Some(OutgoingReport::control(vec![
                    transaction::GET_FEATURE,
                    FEATURE_REPORT_FIRMWARE_VERSION,
                ]))
            }
            Some(FEATURE_REPORT_FIRMWARE_VERSION) => {
                if report.len() != FEATURE_REPORT_FIRMWARE_VERSION_SIZE {
                    warn!(
                        len = report.len(),
                        want = FEATURE_REPORT_FIRMWARE_VERSION_SIZE,
                        "DS4: unexpected firmware version report size"
                    );
                    return None;
                }
                self.hw_version = u16::from_le_bytes([report[35], report[36]]);
                self.fw_version = u16::from_le_bytes([report[41], report[42]]);
                info!(
                    fw = self.fw_version,
                    hw = self.hw_version,
                    "DS4: version report received"
                );
                None
            }
            id => {
                warn!(?id, "DS4: unexpected feature report id");
                None
            }
        }
    }

    fn apply_calibration(&mut self, report: &[u8]) {
        let read = |offset: usize| i16::from_le_bytes([report[offset], report[offset + 1]]);

        let pitch_bias = read(1);
        let yaw_bias = read(3);
        let roll_bias = read(5);
        let pitch_plus = read(7);
        let yaw_plus = read(9);
        let roll_plus = read(11);
        let pitch_minus = read(13);
        let yaw_minus = read(15);
        let roll_minus = read(17);
        let speed_plus = read(19);
        let speed_minus = read(21);

        let speed_2x = i32::from(speed_plus) + i32::from(speed_minus);
        let gyro_denoms = [
            (i32::from(pitch_plus) - i32::from(pitch_bias)).abs()
                + (i32::from(pitch_minus) + i32::from(pitch_bias)).abs(),
            (i32::from(yaw_plus) - i32::from(yaw_bias)).abs()
                + (i32::from(yaw_minus) - i32::from(yaw_bias)).abs(),
            (i32::from(roll_plus) - i32::from(roll_bias)).abs()
                + (i32::from(roll_minus) - i32::from(roll_bias)).abs(),
        ];
        for (i, denom) in gyro_denoms.into_iter().enumerate() {
            // Clones and broken devices ship zeroed calibration; fall back
            // to the identity instead of dividing by zero later.
            self.gyro_calib[i] = if denom == 0 {
                warn!(axis = i, "DS4: invalid gyro calibration, using defaults");
                CalibrationData::identity(GYRO_RANGE)
            } else {
                CalibrationData {
                    bias: 0,
                    sens_numer: speed_2x.saturating_mul(GYRO_RES_PER_DEG_S),
                    sens_denom: denom,
                }
            };
        }

        let accel_pairs = [(read(23), read(25)), (read(27), read(29)), (read(31), read(33))];
        for (i, (plus, minus)) in accel_pairs.into_iter().enumerate() {
            let range_2g = i32::from(plus) - i32::from(minus);
            self.accel_calib[i] = if range_2g == 0 {
                warn!(axis = i, "DS4: invalid accelerometer calibration, using defaults");
                CalibrationData::identity(ACC_RANGE)
            } else {
                CalibrationData {
                    bias: (i32::from(plus) - range_2g / 2) as i16,
                    sens_numer: 2 * crate::report::ACC_RES_PER_G,
                    sens_denom: range_2g,
                }
            };
        }
    }

    pub fn set_lightbar_color(&mut self, red: u8, green: u8, blue: u8) -> OutgoingReport {
        self.prev_color_red = red;
        self.prev_color_green = green;
        self.prev_color_blue = blue;
        self.output_report()
    }

    pub fn set_rumble(&mut self, value: u8, _duration: u8) -> OutgoingReport {
        // The 0x11 output report carries no duration; callers stop the
        // motors with a zero-magnitude rumble.
        self.prev_rumble = value;
        self.output_report()
    }

    fn output_report(&self) -> OutgoingReport {
        OutgoingReport::interrupt(encode_output_report(
            self.prev_rumble,
            self.prev_rumble,
            self.prev_color_red,
            self.prev_color_green,
            self.prev_color_blue,
        ))
    }
}

fn recenter(value: u8) -> i32 {
    ((i32::from(value) - 127) * 4).clamp(-512, 511)
}
