//! Device records and the fixed-capacity registry.

use crate::bt::conn::{BdAddr, BtConnection, ConnectionState};
use crate::error::{EngineError, EngineResult};
use crate::interpreter::{ControllerType, DeviceInterpreter};
use crate::parser;
use openpad_command_buffer::SharedCommandBuffer;
use openpad_controller_types::Controller;
use openpad_hid_common::{OutgoingReport, ReportChannel};
use openpad_hid_dualshock_protocol::{DS4_V1_PID, DS4_V2_PID, Ds4Interpreter, SONY_VID};
use openpad_hid_generic_protocol::{GenericInterpreter, KeyboardInterpreter, MouseInterpreter};
use openpad_hid_icade_protocol::{
    ICADE_8BITTY_PID, ICADE_8BITTY_VID, ICADE_CABINET_VID, ICadeInterpreter,
};
use openpad_hid_ouya_protocol::OuyaInterpreter;
use openpad_hid_xbox_protocol::{XBOX_WIRELESS_PID, XBOX_WIRELESS_VID, XboxInterpreter};
use tracing::{debug, info, warn};

/// How many physical links can be active at once.
pub const MAX_DEVICES: usize = 4;

/// Bound on a stored HID descriptor.
pub const MAX_DESCRIPTOR_LEN: usize = 512;

/// Bound on a stored device name.
pub const MAX_NAME_LEN: usize = 240;

/// OUYA first-generation controller.
const OUYA_VID: u16 = 0x2836;
const OUYA_PID: u16 = 0x0001;

/// Class-of-device bits used for classification.
pub mod cod {
    pub const MAJOR_MASK: u32 = 0x1f00;
    pub const MAJOR_PERIPHERAL: u32 = 0x0500;
    pub const MINOR_MASK: u32 = 0x00fc;
    pub const MINOR_KEYBOARD: u32 = 0x0040;
    pub const MINOR_POINTING: u32 = 0x0080;
}

/// When the SDP queries run relative to the L2CAP connection. Most
/// devices take the query after connecting; first-generation DualShock 4
/// hardware only answers before, and devices classified by other means
/// (name match) skip SDP entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SdpQueryOrdering {
    #[default]
    AfterConnect,
    BeforeConnect,
    NotNeeded,
}

/// Platform hook consulted when a device finishes its handshake. A
/// refusal (`false`) is terminal: the caller must tear the connection
/// down.
pub trait DeviceDelegate {
    fn on_device_ready(&mut self, device: &HidDevice) -> bool;
}

/// Accept-everything delegate.
pub struct AcceptAll;

impl DeviceDelegate for AcceptAll {
    fn on_device_ready(&mut self, _device: &HidDevice) -> bool {
        true
    }
}

/// One connected physical device: identity, descriptor, interpreter and
/// the canonical controller model, plus the embedded connection record.
pub struct HidDevice {
    name: String,
    vendor_id: u16,
    product_id: u16,
    class_of_device: u32,

    hid_descriptor: Vec<u8>,
    sdp_query: SdpQueryOrdering,

    controller_type: Option<ControllerType>,
    interpreter: Option<DeviceInterpreter>,

    pub controller: Controller,
    pub conn: BtConnection,
}

impl HidDevice {
    pub fn new(addr: BdAddr) -> Self {
        Self {
            name: String::new(),
            vendor_id: 0,
            product_id: 0,
            class_of_device: 0,
            hid_descriptor: Vec::new(),
            sdp_query: SdpQueryOrdering::default(),
            controller_type: None,
            interpreter: None,
            controller: Controller::default(),
            conn: BtConnection::new(addr),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    pub fn set_vendor_id(&mut self, vendor_id: u16) {
        self.vendor_id = vendor_id;
    }

    pub fn set_product_id(&mut self, product_id: u16) {
        self.product_id = product_id;
    }

    pub fn class_of_device(&self) -> u32 {
        self.class_of_device
    }

    pub fn set_class_of_device(&mut self, class_of_device: u32) {
        self.class_of_device = class_of_device;
    }

    pub fn hid_descriptor(&self) -> &[u8] {
        &self.hid_descriptor
    }

    pub fn has_hid_descriptor(&self) -> bool {
        !self.hid_descriptor.is_empty()
    }

    /// Replace the descriptor. Exclusively owned by this record; devices
    /// that lie about their descriptor get it swapped at setup time.
    pub fn set_hid_descriptor(&mut self, descriptor: &[u8]) -> EngineResult<()> {
        if descriptor.len() > MAX_DESCRIPTOR_LEN {
            return Err(EngineError::DescriptorTooLarge {
                len: descriptor.len(),
                max: MAX_DESCRIPTOR_LEN,
            });
        }
        self.hid_descriptor = descriptor.to_vec();
        Ok(())
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Store the remote name and classify from it. Hardware impersonating
    /// a known controller gets its identity overwritten with the
    /// known-good one before normal setup proceeds.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.chars().take(MAX_NAME_LEN).collect();
        if self.controller_type.is_some() {
            return;
        }
        if XboxInterpreter::matches_name(&self.name) {
            let identity = XboxInterpreter::identity_override();
            info!(
                addr = %self.conn.address(),
                vendor_id = identity.vendor_id,
                product_id = identity.product_id,
                "name match: forcing Xbox identity"
            );
            self.vendor_id = identity.vendor_id;
            self.product_id = identity.product_id;
            self.hid_descriptor = identity.descriptor.to_vec();
            self.controller_type = Some(ControllerType::Xbox);
            self.sdp_query = SdpQueryOrdering::NotNeeded;
        }
    }

    pub fn sdp_query_ordering(&self) -> SdpQueryOrdering {
        self.sdp_query
    }

    pub fn controller_type(&self) -> Option<ControllerType> {
        self.controller_type
    }

    pub fn has_controller_type(&self) -> bool {
        self.controller_type.is_some()
    }

    /// Classify from vendor/product ids, unless a name match already
    /// decided.
    pub fn guess_controller_type_from_vid_pid(&mut self) {
        if self.controller_type.is_some() {
            return;
        }
        let guessed = match (self.vendor_id, self.product_id) {
            (XBOX_WIRELESS_VID, XBOX_WIRELESS_PID) => Some(ControllerType::Xbox),
            (SONY_VID, DS4_V1_PID | DS4_V2_PID) => Some(ControllerType::DualShock4),
            (OUYA_VID, OUYA_PID) => Some(ControllerType::Ouya),
            (ICADE_CABINET_VID, _) => Some(ControllerType::ICade),
            (ICADE_8BITTY_VID, ICADE_8BITTY_PID) => Some(ControllerType::ICade),
            _ => None,
        };
        if let Some(controller_type) = guessed {
            debug!(addr = %self.conn.address(), ?controller_type, "classified from vid/pid");
            if (self.vendor_id, self.product_id) == (SONY_VID, DS4_V1_PID) {
                self.sdp_query = SdpQueryOrdering::BeforeConnect;
            }
            self.controller_type = Some(controller_type);
        }
    }

    /// Last-resort classification from the class-of-device bits.
    fn controller_type_from_cod(&self) -> ControllerType {
        if self.class_of_device & cod::MAJOR_MASK == cod::MAJOR_PERIPHERAL {
            if self.class_of_device & cod::MINOR_KEYBOARD != 0 {
                return ControllerType::Keyboard;
            }
            if self.class_of_device & cod::MINOR_POINTING != 0 {
                return ControllerType::Mouse;
            }
        }
        ControllerType::Generic
    }

    /// Construct the interpreter for the classified type and queue its
    /// setup reports. Runs once the identity and descriptor are final.
    pub fn setup(&mut self, buffer: &SharedCommandBuffer) -> EngineResult<()> {
        let controller_type = self
            .controller_type
            .unwrap_or_else(|| self.controller_type_from_cod());
        self.controller_type = Some(controller_type);

        let mut interpreter = match controller_type {
            ControllerType::Xbox => {
                DeviceInterpreter::Xbox(XboxInterpreter::new(self.hid_descriptor.len()))
            }
            ControllerType::DualShock4 => DeviceInterpreter::DualShock4(Ds4Interpreter::new()),
            ControllerType::Ouya => DeviceInterpreter::Ouya(OuyaInterpreter::new()),
            ControllerType::ICade => {
                DeviceInterpreter::ICade(ICadeInterpreter::new(self.vendor_id, self.product_id))
            }
            ControllerType::Generic => DeviceInterpreter::Generic(GenericInterpreter::new()),
            ControllerType::Mouse => DeviceInterpreter::Mouse(MouseInterpreter::new(
                self.vendor_id,
                self.product_id,
                &self.name,
            )),
            ControllerType::Keyboard => DeviceInterpreter::Keyboard(KeyboardInterpreter::new()),
        };
        info!(addr = %self.conn.address(), interpreter = interpreter.name(), "device setup");

        for report in interpreter.setup_reports() {
            self.queue_report(buffer, &report)?;
        }
        self.interpreter = Some(interpreter);
        Ok(())
    }

    pub fn interpreter(&self) -> Option<&DeviceInterpreter> {
        self.interpreter.as_ref()
    }

    /// Finish the handshake: move to pending-ready, consult the platform
    /// delegate, then mark ready. A refusal is terminal.
    pub fn set_ready(&mut self, delegate: &mut dyn DeviceDelegate) -> EngineResult<()> {
        self.conn.set_state(ConnectionState::DevicePendingReady)?;
        if !delegate.on_device_ready(self) {
            warn!(addr = %self.conn.address(), "device refused by delegate");
            return Err(EngineError::DeviceRejected);
        }
        self.conn.set_state(ConnectionState::DeviceReady)
    }

    /// Parse one incoming input report into the controller model. Gated:
    /// reports are only trusted at `DeviceReady`.
    pub fn process_report(&mut self, report: &[u8]) -> EngineResult<()> {
        if !self.conn.is_ready() {
            debug!(addr = %self.conn.address(), state = ?self.conn.state(), "dropping report, not ready");
            return Err(EngineError::NotReady);
        }
        let interpreter = self.interpreter.as_mut().ok_or(EngineError::NoInterpreter)?;
        parser::parse_input_report(
            interpreter,
            &mut self.controller,
            &self.hid_descriptor,
            report,
        );
        Ok(())
    }

    /// Feature-report responses; a follow-up request may get queued.
    pub fn process_feature_report(
        &mut self,
        buffer: &SharedCommandBuffer,
        report: &[u8],
    ) -> EngineResult<()> {
        let interpreter = self.interpreter.as_mut().ok_or(EngineError::NoInterpreter)?;
        if let Some(followup) = interpreter.parse_feature_report(report) {
            self.queue_report(buffer, &followup)?;
        }
        Ok(())
    }

    pub fn supports_rumble(&self) -> bool {
        self.interpreter.as_ref().is_some_and(|i| i.has_rumble())
    }

    pub fn supports_player_leds(&self) -> bool {
        self.interpreter.as_ref().is_some_and(|i| i.has_player_leds())
    }

    pub fn supports_lightbar_color(&self) -> bool {
        self.interpreter
            .as_ref()
            .is_some_and(|i| i.has_lightbar_color())
    }

    pub fn set_rumble(
        &mut self,
        buffer: &SharedCommandBuffer,
        magnitude: u8,
        duration: u8,
    ) -> EngineResult<()> {
        let interpreter = self.interpreter.as_mut().ok_or(EngineError::NoInterpreter)?;
        let report = interpreter
            .set_rumble(magnitude, duration)
            .ok_or(EngineError::UnsupportedFeedback)?;
        self.queue_report(buffer, &report)
    }

    pub fn set_player_leds(&mut self, buffer: &SharedCommandBuffer, leds: u8) -> EngineResult<()> {
        let interpreter = self.interpreter.as_mut().ok_or(EngineError::NoInterpreter)?;
        let report = interpreter
            .set_player_leds(leds)
            .ok_or(EngineError::UnsupportedFeedback)?;
        self.queue_report(buffer, &report)
    }

    pub fn set_lightbar_color(
        &mut self,
        buffer: &SharedCommandBuffer,
        red: u8,
        green: u8,
        blue: u8,
    ) -> EngineResult<()> {
        let interpreter = self.interpreter.as_mut().ok_or(EngineError::NoInterpreter)?;
        let report = interpreter
            .set_lightbar_color(red, green, blue)
            .ok_or(EngineError::UnsupportedFeedback)?;
        self.queue_report(buffer, &report)
    }

    /// Queue an encoded report against this connection's channel id. Full
    /// buffer means the packet is dropped; feedback is best-effort.
    pub fn queue_report(
        &self,
        buffer: &SharedCommandBuffer,
        report: &OutgoingReport,
    ) -> EngineResult<()> {
        let cid = match report.channel {
            ReportChannel::Control => self.conn.control_cid,
            ReportChannel::Interrupt => self.conn.interrupt_cid,
        };
        buffer.put(cid, &report.bytes).inspect_err(|err| {
            warn!(addr = %self.conn.address(), %err, "dropping outgoing packet");
        })?;
        Ok(())
    }
}

/// Fixed table of connected devices.
pub struct DeviceRegistry {
    devices: [Option<HidDevice>; MAX_DEVICES],
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: std::array::from_fn(|_| None),
        }
    }

    /// Create a record for a newly discovered address, or hand back the
    /// existing one.
    pub fn create(&mut self, addr: BdAddr) -> EngineResult<&mut HidDevice> {
        let idx = if let Some(idx) = self.index_for_address(addr) {
            debug!(%addr, "device already known");
            idx
        } else {
            let Some(idx) = self.devices.iter().position(|slot| slot.is_none()) else {
                warn!(%addr, "device table full");
                return Err(EngineError::DeviceTableFull { max: MAX_DEVICES });
            };
            info!(%addr, "new device");
            self.devices[idx] = Some(HidDevice::new(addr));
            idx
        };
        self.devices[idx]
            .as_mut()
            .ok_or(EngineError::DeviceTableFull { max: MAX_DEVICES })
    }

    fn index_for_address(&self, addr: BdAddr) -> Option<usize> {
        self.devices
            .iter()
            .position(|d| d.as_ref().is_some_and(|d| d.conn.address() == addr))
    }

    pub fn get_for_address(&self, addr: BdAddr) -> Option<&HidDevice> {
        self.devices
            .iter()
            .flatten()
            .find(|d| d.conn.address() == addr)
    }

    pub fn get_for_address_mut(&mut self, addr: BdAddr) -> Option<&mut HidDevice> {
        self.devices
            .iter_mut()
            .flatten()
            .find(|d| d.conn.address() == addr)
    }

    /// Look up by either L2CAP channel id. Zero cids never match.
    pub fn get_for_cid(&self, cid: u16) -> Option<&HidDevice> {
        if cid == 0 {
            return None;
        }
        self.devices
            .iter()
            .flatten()
            .find(|d| d.conn.control_cid == cid || d.conn.interrupt_cid == cid)
    }

    pub fn get_for_cid_mut(&mut self, cid: u16) -> Option<&mut HidDevice> {
        if cid == 0 {
            return None;
        }
        self.devices
            .iter_mut()
            .flatten()
            .find(|d| d.conn.control_cid == cid || d.conn.interrupt_cid == cid)
    }

    pub fn get_for_handle(&self, handle: u16) -> Option<&HidDevice> {
        if handle == crate::bt::conn::INVALID_HANDLE {
            return None;
        }
        self.devices
            .iter()
            .flatten()
            .find(|d| d.conn.handle() == handle)
    }

    /// Destroy the record. Packets still queued against its channel ids
    /// become unreachable and are dropped by the flusher.
    pub fn delete(&mut self, addr: BdAddr) -> bool {
        match self.index_for_address(addr) {
            Some(idx) => {
                info!(%addr, "deleting device");
                self.devices[idx] = None;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HidDevice> {
        self.devices.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.devices.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
