//! The input-report parsing engine.
//!
//! Strict ordering per report: (1) init-report resets the model to a
//! zeroed baseline of the right class, because every report is a
//! full-state snapshot; (2) descriptor-less devices hand the whole byte
//! buffer to the raw path and stop there; (3) everyone else walks the
//! descriptor and dispatches one `(usage page, usage, value)` triple per
//! field, each with its own globals snapshot. The engine never interprets
//! usage codes itself.
//!
//! The whole sequence runs under one `&mut` borrow of the device, so a
//! reader never observes a mix of two physical reports.

use crate::interpreter::DeviceInterpreter;
use openpad_controller_types::Controller;
use openpad_hid_common::ReportWalker;
use tracing::trace;

pub fn parse_input_report(
    interpreter: &mut DeviceInterpreter,
    controller: &mut Controller,
    descriptor: &[u8],
    report: &[u8],
) {
    if interpreter.has_init_report() {
        interpreter.init_report(controller);
    }

    if interpreter.has_raw_report() {
        interpreter.parse_raw_report(controller, report);
        return;
    }

    if interpreter.has_parse_usage() {
        for field in ReportWalker::new(descriptor, report) {
            trace!(
                usage_page = field.usage_page,
                usage = field.usage,
                value = field.value,
                "field"
            );
            interpreter.parse_usage(
                controller,
                &field.globals,
                field.usage_page,
                field.usage,
                field.value,
            );
        }
    }
    // An interpreter with neither input path (setup/feedback only) makes
    // this a no-op parse, which is fine.
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpad_controller_types::{BUTTON_A, BUTTON_B, ControllerClass};
    use openpad_hid_dualshock_protocol::Ds4Interpreter;
    use openpad_hid_generic_protocol::GenericInterpreter;

    // Two buttons, one byte.
    const BUTTONS_DESCRIPTOR: &[u8] = &[
        0x05, 0x09, // Usage Page (Button)
        0x19, 0x01, // Usage Minimum (1)
        0x29, 0x02, // Usage Maximum (2)
        0x15, 0x00, // Logical Minimum (0)
        0x25, 0x01, // Logical Maximum (1)
        0x75, 0x01, // Report Size (1)
        0x95, 0x02, // Report Count (2)
        0x81, 0x02, // Input (Data,Var,Abs)
        0x75, 0x06, // Report Size (6)
        0x95, 0x01, // Report Count (1)
        0x81, 0x03, // Input (Const)
    ];

    #[test]
    fn descriptor_path_resets_then_populates() {
        let mut interpreter = DeviceInterpreter::Generic(GenericInterpreter::new());
        let mut controller = Controller::default();

        parse_input_report(&mut interpreter, &mut controller, BUTTONS_DESCRIPTOR, &[0x03]);
        assert_eq!(
            controller.gamepad().map(|gp| gp.buttons),
            Some(BUTTON_A | BUTTON_B)
        );

        // The next report is a full snapshot: released buttons vanish.
        parse_input_report(&mut interpreter, &mut controller, BUTTONS_DESCRIPTOR, &[0x01]);
        assert_eq!(controller.gamepad().map(|gp| gp.buttons), Some(BUTTON_A));
    }

    #[test]
    fn raw_path_skips_descriptor_walk() {
        let mut interpreter = DeviceInterpreter::DualShock4(Ds4Interpreter::new());
        let mut controller = Controller::default();

        // Simple-mode DS4 report; the descriptor is empty and unused.
        let report = [0x01, 0x80, 0x80, 0x80, 0x80, 0x28, 0x00, 0x00, 0x00, 0x00];
        parse_input_report(&mut interpreter, &mut controller, &[], &report);
        assert_eq!(controller.class(), ControllerClass::Gamepad);
        assert_eq!(controller.gamepad().map(|gp| gp.buttons), Some(BUTTON_A));
    }

    #[test]
    fn reparse_is_idempotent() {
        let mut interpreter = DeviceInterpreter::Generic(GenericInterpreter::new());
        let mut controller = Controller::default();

        parse_input_report(&mut interpreter, &mut controller, BUTTONS_DESCRIPTOR, &[0x02]);
        let first = controller;
        parse_input_report(&mut interpreter, &mut controller, BUTTONS_DESCRIPTOR, &[0x02]);
        assert_eq!(controller, first);
    }
}
