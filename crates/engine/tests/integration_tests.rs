//! End-to-end engine tests: handshake, parsing, feedback round trips.

use openpad_command_buffer::SharedCommandBuffer;
use openpad_controller_types::{BUTTON_A, ControllerClass, DPAD_UP, Gamepad};
use openpad_engine::{
    AcceptAll, BdAddr, ConnectionState, DeviceDelegate, DeviceRegistry, EngineError, HidDevice,
    Transport, TransportError, TransportProtocol, flush_queued,
};

#[derive(Default)]
struct MockTransport {
    sent: Vec<(u16, Vec<u8>)>,
}

impl Transport for MockTransport {
    fn send(&mut self, cid: u16, data: &[u8]) -> Result<(), TransportError> {
        self.sent.push((cid, data.to_vec()));
        Ok(())
    }
}

struct RejectAll;

impl DeviceDelegate for RejectAll {
    fn on_device_ready(&mut self, _device: &HidDevice) -> bool {
        false
    }
}

/// A 16-byte report layout in the style of the Xbox v3.1 firmware:
/// four 16-bit stick axes, two 10-bit pedals, a hat nibble, ten buttons
/// and the system button.
const XBOX_V3_STYLE_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xa1, 0x01, // Collection (Application)
    0x09, 0x30, // Usage (X)
    0x09, 0x31, // Usage (Y)
    0x09, 0x33, // Usage (Rx)
    0x09, 0x34, // Usage (Ry)
    0x15, 0x00, // Logical Minimum (0)
    0x27, 0xff, 0xff, 0x00, 0x00, // Logical Maximum (65535)
    0x75, 0x10, // Report Size (16)
    0x95, 0x04, // Report Count (4)
    0x81, 0x02, // Input (Data,Var,Abs)
    0x09, 0x32, // Usage (Z) - brake on v3.1
    0x15, 0x00, // Logical Minimum (0)
    0x26, 0xff, 0x03, // Logical Maximum (1023)
    0x75, 0x0a, // Report Size (10)
    0x95, 0x01, // Report Count (1)
    0x81, 0x02, // Input (Data,Var,Abs)
    0x75, 0x06, // Report Size (6)
    0x95, 0x01, // Report Count (1)
    0x81, 0x03, // Input (Const)
    0x09, 0x35, // Usage (Rz) - throttle on v3.1
    0x15, 0x00, // Logical Minimum (0)
    0x26, 0xff, 0x03, // Logical Maximum (1023)
    0x75, 0x0a, // Report Size (10)
    0x95, 0x01, // Report Count (1)
    0x81, 0x02, // Input (Data,Var,Abs)
    0x75, 0x06, // Report Size (6)
    0x95, 0x01, // Report Count (1)
    0x81, 0x03, // Input (Const)
    0x09, 0x39, // Usage (Hat switch)
    0x15, 0x01, // Logical Minimum (1)
    0x25, 0x08, // Logical Maximum (8)
    0x75, 0x04, // Report Size (4)
    0x95, 0x01, // Report Count (1)
    0x81, 0x42, // Input (Data,Var,Null)
    0x75, 0x04, // Report Size (4)
    0x95, 0x01, // Report Count (1)
    0x81, 0x03, // Input (Const)
    0x05, 0x09, // Usage Page (Button)
    0x19, 0x01, // Usage Minimum (1)
    0x29, 0x0a, // Usage Maximum (10)
    0x15, 0x00, // Logical Minimum (0)
    0x25, 0x01, // Logical Maximum (1)
    0x75, 0x01, // Report Size (1)
    0x95, 0x0a, // Report Count (10)
    0x81, 0x02, // Input (Data,Var,Abs)
    0x75, 0x06, // Report Size (6)
    0x95, 0x01, // Report Count (1)
    0x81, 0x03, // Input (Const)
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x85, // Usage (System Main Menu)
    0x15, 0x00, // Logical Minimum (0)
    0x25, 0x01, // Logical Maximum (1)
    0x75, 0x01, // Report Size (1)
    0x95, 0x01, // Report Count (1)
    0x81, 0x02, // Input (Data,Var,Abs)
    0x75, 0x07, // Report Size (7)
    0x95, 0x01, // Report Count (1)
    0x81, 0x03, // Input (Const)
    0xc0, // End Collection
];

/// Sticks centered, pedals released, D-pad up, button A pressed.
const DPAD_UP_BUTTON_A_REPORT: [u8; 16] = [
    0x00, 0x80, // X centered
    0x00, 0x80, // Y centered
    0x00, 0x80, // Rx centered
    0x00, 0x80, // Ry centered
    0x00, 0x00, // brake 0 + pad
    0x00, 0x00, // throttle 0 + pad
    0x01, // hat: 1 = up (logical minimum is 1)
    0x01, // buttons 1..8: A pressed
    0x00, // buttons 9..10 + pad
    0x00, // system button + pad
];

const ADDR: BdAddr = BdAddr([0xc8, 0x3f, 0x26, 0x01, 0x02, 0x03]);

/// Walk a BR/EDR connection up to the point where the device is ready to
/// be handed to the delegate.
fn walk_br_edr_handshake(device: &mut HidDevice) {
    device.conn.set_protocol(TransportProtocol::BrEdr).unwrap();
    for state in [
        ConnectionState::Discovered,
        ConnectionState::RemoteNameRequest,
        ConnectionState::RemoteNameInquired,
        ConnectionState::RemoteNameFetched,
        ConnectionState::SdpVendorRequested,
        ConnectionState::SdpVendorFetched,
        ConnectionState::SdpHidDescriptorRequested,
        ConnectionState::SdpHidDescriptorFetched,
        ConnectionState::L2capControlRequested,
        ConnectionState::L2capControlConnected,
        ConnectionState::L2capInterruptRequested,
        ConnectionState::L2capInterruptConnected,
    ] {
        device.conn.set_state(state).unwrap();
    }
    device.conn.set_connected(true);
    device.conn.control_cid = 0x40;
    device.conn.interrupt_cid = 0x41;
}

fn setup_xbox(registry: &mut DeviceRegistry, buffer: &SharedCommandBuffer) {
    let device = registry.create(ADDR).unwrap();
    walk_br_edr_handshake(device);
    device.set_vendor_id(0x045e);
    device.set_product_id(0x02e0);
    device.guess_controller_type_from_vid_pid();
    device.set_hid_descriptor(XBOX_V3_STYLE_DESCRIPTOR).unwrap();
    device.setup(buffer).unwrap();
    device.set_ready(&mut AcceptAll).unwrap();
}

#[test]
fn xbox_v3_style_report_end_to_end() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();
    setup_xbox(&mut registry, &buffer);

    let device = registry.get_for_address_mut(ADDR).unwrap();
    device.process_report(&DPAD_UP_BUTTON_A_REPORT).unwrap();

    let gp = device.controller.gamepad().unwrap();
    assert_eq!(gp.dpad, DPAD_UP);
    assert_eq!(gp.buttons, BUTTON_A);
    assert_eq!(gp.misc_buttons, 0);
    assert_eq!((gp.axis_x, gp.axis_y, gp.axis_rx, gp.axis_ry), (0, 0, 0, 0));
    assert_eq!((gp.brake, gp.throttle), (0, 0));

    // Re-parsing the identical report leaves the model unchanged.
    let snapshot = device.controller;
    device.process_report(&DPAD_UP_BUTTON_A_REPORT).unwrap();
    assert_eq!(device.controller, snapshot);
}

#[test]
fn reports_are_rejected_before_device_ready() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();

    let device = registry.create(ADDR).unwrap();
    walk_br_edr_handshake(device);
    device.set_vendor_id(0x045e);
    device.set_product_id(0x02e0);
    device.guess_controller_type_from_vid_pid();
    device.set_hid_descriptor(XBOX_V3_STYLE_DESCRIPTOR).unwrap();
    device.setup(&buffer).unwrap();

    // Still L2capInterruptConnected: parsing is gated.
    assert_eq!(
        device.process_report(&DPAD_UP_BUTTON_A_REPORT),
        Err(EngineError::NotReady)
    );
    assert_eq!(device.controller.class(), ControllerClass::None);
}

#[test]
fn rumble_round_trips_through_buffer_to_transport() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();
    setup_xbox(&mut registry, &buffer);

    let device = registry.get_for_address_mut(ADDR).unwrap();
    assert!(device.supports_rumble());
    device.set_rumble(&buffer, 0xff, 0x80).unwrap();

    let mut transport = MockTransport::default();
    assert_eq!(flush_queued(&buffer, &registry, &mut transport), 1);
    assert_eq!(
        transport.sent,
        vec![(0x41, vec![0xa2, 0x03, 0x0f, 127, 127, 0, 0, 0x80, 0, 0])]
    );
    assert!(buffer.is_empty());
}

#[test]
fn queued_feedback_dies_with_the_connection() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();
    setup_xbox(&mut registry, &buffer);

    let device = registry.get_for_address_mut(ADDR).unwrap();
    device.set_rumble(&buffer, 0x80, 0x10).unwrap();

    // Device teardown invalidates everything still queued for it.
    assert!(registry.delete(ADDR));
    let mut transport = MockTransport::default();
    assert_eq!(flush_queued(&buffer, &registry, &mut transport), 0);
    assert!(transport.sent.is_empty());
    assert!(buffer.is_empty());
}

#[test]
fn ble_handshake_skips_br_edr_stages() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();

    let device = registry.create(ADDR).unwrap();
    device.conn.set_protocol(TransportProtocol::Le).unwrap();
    device.conn.set_state(ConnectionState::Discovered).unwrap();
    device.conn.set_connected(true);
    device.set_class_of_device(0x0500 | 0x80); // peripheral, pointing
    device.setup(&buffer).unwrap();
    device.set_ready(&mut AcceptAll).unwrap();
    assert!(device.conn.is_ready());

    // BR/EDR-only stages remain illegal even after ready.
    assert!(device.conn.set_state(ConnectionState::SdpVendorRequested).is_err());
}

#[test]
fn delegate_rejection_is_terminal() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();

    let device = registry.create(ADDR).unwrap();
    walk_br_edr_handshake(device);
    device.set_hid_descriptor(XBOX_V3_STYLE_DESCRIPTOR).unwrap();
    device.setup(&buffer).unwrap();

    assert_eq!(
        device.set_ready(&mut RejectAll),
        Err(EngineError::DeviceRejected)
    );
    assert!(!device.conn.is_ready());

    // Caller tears the connection down; teardown is idempotent.
    device.conn.disconnect();
    device.conn.disconnect();
    assert_eq!(device.conn.state(), ConnectionState::None);
}

#[test]
fn dualshock_setup_and_lightbar_flow() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();

    let device = registry.create(ADDR).unwrap();
    walk_br_edr_handshake(device);
    device.set_vendor_id(0x054c);
    device.set_product_id(0x09cc);
    device.guess_controller_type_from_vid_pid();
    device.setup(&buffer).unwrap();

    // Setup queued the lightbar-enable and the calibration request, but
    // nothing is transmitted before the device is ready.
    let mut transport = MockTransport::default();
    assert_eq!(flush_queued(&buffer, &registry, &mut transport), 0);
    assert!(!buffer.is_empty());

    let device = registry.get_for_address_mut(ADDR).unwrap();
    device.set_ready(&mut AcceptAll).unwrap();

    let mut transport = MockTransport::default();
    assert_eq!(flush_queued(&buffer, &registry, &mut transport), 2);
    // Lightbar-enable goes out on the interrupt channel, the calibration
    // feature request on the control channel.
    assert_eq!(transport.sent[0].0, 0x41);
    assert_eq!(transport.sent[0].1.len(), 79);
    assert_eq!(transport.sent[1], (0x40, vec![0x43, 0x02]));

    // Raw report path updates the model.
    let device = registry.get_for_address_mut(ADDR).unwrap();
    let report = [0x01, 0x80, 0x80, 0x80, 0x80, 0x28, 0x00, 0x00, 0x00, 0x00];
    device.process_report(&report).unwrap();
    assert_eq!(device.controller.gamepad().map(|gp| gp.buttons), Some(BUTTON_A));

    // Lightbar color round trip.
    assert!(device.supports_lightbar_color());
    device.set_lightbar_color(&buffer, 0x20, 0x00, 0x20).unwrap();
    let mut transport = MockTransport::default();
    assert_eq!(flush_queued(&buffer, &registry, &mut transport), 1);
    let (cid, bytes) = &transport.sent[0];
    assert_eq!(*cid, 0x41);
    assert_eq!(bytes[9..12], [0x20, 0x00, 0x20]);
}

#[test]
fn feedback_capability_absence_is_checked_not_fatal() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();

    let device = registry.create(ADDR).unwrap();
    walk_br_edr_handshake(device);
    device.setup(&buffer).unwrap(); // falls back to the generic gamepad
    device.set_ready(&mut AcceptAll).unwrap();

    assert!(!device.supports_lightbar_color());
    assert_eq!(
        device.set_lightbar_color(&buffer, 1, 2, 3),
        Err(EngineError::UnsupportedFeedback)
    );
    assert!(buffer.is_empty());
}

#[test]
fn unrecognized_usages_degrade_to_no_input() {
    let mut registry = DeviceRegistry::new();
    let buffer = SharedCommandBuffer::new();
    setup_xbox(&mut registry, &buffer);

    // A descriptor field the Xbox tables do not know: vendor page usage.
    let descriptor: &[u8] = &[
        0x06, 0x00, 0xff, // Usage Page (Vendor 0xff00)
        0x09, 0x01, // Usage (1)
        0x15, 0x00, // Logical Minimum (0)
        0x26, 0xff, 0x00, // Logical Maximum (255)
        0x75, 0x08, // Report Size (8)
        0x95, 0x01, // Report Count (1)
        0x81, 0x02, // Input
    ];
    let device = registry.get_for_address_mut(ADDR).unwrap();
    device.set_hid_descriptor(descriptor).unwrap();
    device.process_report(&[0x7f]).unwrap();

    // Logged and ignored: the model is a clean zeroed gamepad.
    assert_eq!(device.controller.gamepad(), Some(&Gamepad::default()));
}
