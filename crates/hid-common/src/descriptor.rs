//! HID report-descriptor walker.
//!
//! [`ReportWalker`] iterates the Input main items of a report descriptor
//! against one raw input report and yields one [`ExtractedField`] per
//! field: `(usage_page, usage, value)` plus a [`HidGlobals`] snapshot taken
//! before the field consumed its bits. The walker's own global state keeps
//! mutating as the walk advances, so handlers must only ever use the
//! snapshot embedded in the field.
//!
//! Supported: short items, Push/Pop, Report IDs (items belonging to a
//! different report id neither emit nor consume bits), constant padding,
//! variable and array fields, 32-bit extended usages, sign extension for
//! fields with a negative logical minimum. Long items and the
//! Unit/Physical/Designator/String items are skipped; none of the
//! supported device catalog uses them.

use crate::HidGlobals;
use tracing::{debug, trace};

const ITEM_TYPE_MAIN: u8 = 0;
const ITEM_TYPE_GLOBAL: u8 = 1;
const ITEM_TYPE_LOCAL: u8 = 2;

const MAIN_INPUT: u8 = 8;
const MAIN_OUTPUT: u8 = 9;
const MAIN_COLLECTION: u8 = 10;
const MAIN_FEATURE: u8 = 11;
const MAIN_END_COLLECTION: u8 = 12;

const GLOBAL_USAGE_PAGE: u8 = 0;
const GLOBAL_LOGICAL_MINIMUM: u8 = 1;
const GLOBAL_LOGICAL_MAXIMUM: u8 = 2;
const GLOBAL_REPORT_SIZE: u8 = 7;
const GLOBAL_REPORT_ID: u8 = 8;
const GLOBAL_REPORT_COUNT: u8 = 9;
const GLOBAL_PUSH: u8 = 10;
const GLOBAL_POP: u8 = 11;

const LOCAL_USAGE: u8 = 0;
const LOCAL_USAGE_MINIMUM: u8 = 1;
const LOCAL_USAGE_MAXIMUM: u8 = 2;

const INPUT_FLAG_CONSTANT: u32 = 1 << 0;
const INPUT_FLAG_VARIABLE: u32 = 1 << 1;

/// One field extracted from an input report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    pub usage_page: u16,
    pub usage: u16,
    pub value: i32,
    /// Parsing context captured for this field; see [`HidGlobals`].
    pub globals: HidGlobals,
}

/// Local items of the current main-item group.
#[derive(Debug, Default, Clone)]
struct Locals {
    usages: Vec<u32>,
    usage_minimum: Option<u32>,
    usage_maximum: Option<u32>,
}

/// An Input main item currently being emitted field by field.
#[derive(Debug)]
struct ActiveInput {
    flags: u32,
    count: u16,
    index: u16,
    globals: HidGlobals,
    locals: Locals,
}

pub struct ReportWalker<'a> {
    descriptor: &'a [u8],
    pos: usize,
    report: &'a [u8],
    /// Bit offset into the report payload (report id byte excluded).
    bit_pos: usize,
    globals: HidGlobals,
    globals_stack: Vec<HidGlobals>,
    locals: Locals,
    uses_report_ids: bool,
    active: Option<ActiveInput>,
    finished: bool,
}

impl<'a> ReportWalker<'a> {
    pub fn new(descriptor: &'a [u8], report: &'a [u8]) -> Self {
        Self {
            descriptor,
            pos: 0,
            report,
            bit_pos: 0,
            globals: HidGlobals::default(),
            globals_stack: Vec::new(),
            locals: Locals::default(),
            uses_report_ids: false,
            active: None,
            finished: false,
        }
    }

    /// Report id carried by the report itself (first byte).
    fn report_id(&self) -> u16 {
        if self.report.is_empty() {
            0
        } else {
            u16::from(self.report[0])
        }
    }

    fn extract_bits(&mut self, size: u16) -> Option<u32> {
        let payload = if self.uses_report_ids && !self.report.is_empty() {
            &self.report[1..]
        } else {
            self.report
        };
        let size = size.min(32) as usize;
        if self.bit_pos + size > payload.len() * 8 {
            return None;
        }
        let mut value: u32 = 0;
        for i in 0..size {
            let bit = self.bit_pos + i;
            if payload[bit / 8] & (1 << (bit % 8)) != 0 {
                value |= 1 << i;
            }
        }
        self.bit_pos += size;
        Some(value)
    }

    fn sign_extend(value: u32, size: u16, globals: &HidGlobals) -> i32 {
        let size = size.min(32) as u32;
        if globals.logical_minimum < 0 && size < 32 && value & (1 << (size - 1)) != 0 {
            (value | !((1u32 << size) - 1)) as i32
        } else {
            value as i32
        }
    }

    /// Yield the next field of the active Input item, if any.
    fn emit_from_active(&mut self) -> Option<ExtractedField> {
        loop {
            let (flags, globals) = match &self.active {
                Some(active) if active.index < active.count => (active.flags, active.globals),
                _ => {
                    self.active = None;
                    return None;
                }
            };

            let raw = match self.extract_bits(globals.report_size) {
                Some(raw) => raw,
                None => {
                    // Short report. Routine for devices that truncate
                    // trailing fields; end the walk.
                    debug!(bit_pos = self.bit_pos, "report exhausted mid-field");
                    self.finished = true;
                    self.active = None;
                    return None;
                }
            };

            let active = match &mut self.active {
                Some(active) => active,
                None => return None,
            };
            let index = active.index;
            active.index += 1;

            if flags & INPUT_FLAG_VARIABLE != 0 {
                let extended = if let Some(min) = active.locals.usage_minimum {
                    let max = active.locals.usage_maximum.unwrap_or(min).max(min);
                    Some(min + u32::from(index).min(max - min))
                } else if active.locals.usages.is_empty() {
                    None
                } else {
                    // The last usage repeats when the list is shorter than
                    // the report count.
                    let idx = usize::from(index).min(active.locals.usages.len() - 1);
                    Some(active.locals.usages[idx])
                };

                let Some(extended) = extended else {
                    // Variable field without a usage: treat as padding.
                    continue;
                };
                let (usage_page, usage) = split_usage(extended, globals.usage_page);
                return Some(ExtractedField {
                    usage_page,
                    usage,
                    value: Self::sign_extend(raw, globals.report_size, &globals),
                    globals,
                });
            }

            // Array item: the extracted value selects the usage; a zero
            // slot reports the base usage as released. This is the path
            // keyboard-style devices use.
            let base = active.locals.usage_minimum.unwrap_or(0);
            let (usage_page, usage) = split_usage(base.saturating_add(raw), globals.usage_page);
            return Some(ExtractedField {
                usage_page,
                usage,
                value: i32::from(raw != 0),
                globals,
            });
        }
    }

    fn item_data_unsigned(&self, size: usize) -> u32 {
        let mut value: u32 = 0;
        for i in 0..size {
            if let Some(&byte) = self.descriptor.get(self.pos + 1 + i) {
                value |= u32::from(byte) << (8 * i);
            }
        }
        value
    }

    fn item_data_signed(&self, size: usize) -> i32 {
        let raw = self.item_data_unsigned(size);
        match size {
            1 => i32::from(raw as u8 as i8),
            2 => i32::from(raw as u16 as i16),
            _ => raw as i32,
        }
    }

    /// Process descriptor items until the next Input main item is staged
    /// or the descriptor ends. Returns false when exhausted.
    fn advance(&mut self) -> bool {
        while self.pos < self.descriptor.len() {
            let prefix = self.descriptor[self.pos];

            if prefix == 0xfe {
                // Long item: [0xfe, size, tag, data...]. Never used by the
                // supported catalog.
                let size = self.descriptor.get(self.pos + 1).copied().unwrap_or(0);
                debug!(size, "skipping long item");
                self.pos += 3 + usize::from(size);
                continue;
            }

            let size = match prefix & 0x03 {
                3 => 4,
                n => usize::from(n),
            };
            let item_type = (prefix >> 2) & 0x03;
            let tag = (prefix >> 4) & 0x0f;

            if self.pos + 1 + size > self.descriptor.len() {
                debug!(pos = self.pos, "truncated descriptor item");
                break;
            }

            match item_type {
                ITEM_TYPE_MAIN => {
                    let data = self.item_data_unsigned(size);
                    let staged = self.handle_main(tag, data);
                    self.pos += 1 + size;
                    if staged {
                        return true;
                    }
                }
                ITEM_TYPE_GLOBAL => {
                    self.handle_global(tag, size);
                    self.pos += 1 + size;
                }
                ITEM_TYPE_LOCAL => {
                    let data = self.item_data_unsigned(size);
                    self.handle_local(tag, data, size);
                    self.pos += 1 + size;
                }
                _ => {
                    debug!(prefix, "skipping reserved item");
                    self.pos += 1 + size;
                }
            }
        }
        false
    }

    /// Returns true when an Input item was staged for emission.
    fn handle_main(&mut self, tag: u8, data: u32) -> bool {
        let mut staged = false;
        match tag {
            MAIN_INPUT => {
                let matches_report = !self.uses_report_ids || self.globals.report_id == self.report_id();
                if matches_report {
                    if data & INPUT_FLAG_CONSTANT != 0 {
                        // Padding: consumes bits, emits nothing.
                        let bits = usize::from(self.globals.report_size) * usize::from(self.globals.report_count);
                        self.bit_pos += bits;
                    } else {
                        self.active = Some(ActiveInput {
                            flags: data,
                            count: self.globals.report_count,
                            index: 0,
                            globals: self.globals,
                            locals: std::mem::take(&mut self.locals),
                        });
                        staged = true;
                    }
                } else {
                    trace!(
                        item_report_id = self.globals.report_id,
                        report_id = self.report_id(),
                        "skipping input item for other report id"
                    );
                }
            }
            MAIN_OUTPUT | MAIN_FEATURE | MAIN_COLLECTION | MAIN_END_COLLECTION => {}
            _ => debug!(tag, "unsupported main item"),
        }
        self.locals = Locals::default();
        staged
    }

    fn handle_global(&mut self, tag: u8, size: usize) {
        match tag {
            GLOBAL_USAGE_PAGE => self.globals.usage_page = self.item_data_unsigned(size) as u16,
            GLOBAL_LOGICAL_MINIMUM => self.globals.logical_minimum = self.item_data_signed(size),
            GLOBAL_LOGICAL_MAXIMUM => self.globals.logical_maximum = self.item_data_signed(size),
            GLOBAL_REPORT_SIZE => self.globals.report_size = self.item_data_unsigned(size) as u16,
            GLOBAL_REPORT_ID => {
                self.globals.report_id = self.item_data_unsigned(size) as u16;
                self.uses_report_ids = true;
            }
            GLOBAL_REPORT_COUNT => self.globals.report_count = self.item_data_unsigned(size) as u16,
            GLOBAL_PUSH => self.globals_stack.push(self.globals),
            GLOBAL_POP => match self.globals_stack.pop() {
                Some(globals) => self.globals = globals,
                None => debug!("pop with empty globals stack"),
            },
            // Physical range, unit, unit exponent: not needed for any
            // supported device.
            _ => trace!(tag, "ignoring global item"),
        }
    }

    fn handle_local(&mut self, tag: u8, data: u32, size: usize) {
        match tag {
            LOCAL_USAGE => {
                let extended = if size == 4 {
                    data
                } else {
                    u32::from(self.globals.usage_page) << 16 | data
                };
                self.locals.usages.push(extended);
            }
            LOCAL_USAGE_MINIMUM => {
                let extended = if size == 4 {
                    data
                } else {
                    u32::from(self.globals.usage_page) << 16 | data
                };
                self.locals.usage_minimum = Some(extended);
            }
            LOCAL_USAGE_MAXIMUM => {
                let extended = if size == 4 {
                    data
                } else {
                    u32::from(self.globals.usage_page) << 16 | data
                };
                self.locals.usage_maximum = Some(extended);
            }
            _ => trace!(tag, "ignoring local item"),
        }
    }
}

fn split_usage(extended: u32, default_page: u16) -> (u16, u16) {
    let page = (extended >> 16) as u16;
    if page != 0 {
        (page, extended as u16)
    } else {
        (default_page, extended as u16)
    }
}

impl Iterator for ReportWalker<'_> {
    type Item = ExtractedField;

    fn next(&mut self) -> Option<ExtractedField> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(field) = self.emit_from_active() {
                return Some(field);
            }
            if self.finished || !self.advance() {
                return None;
            }
        }
    }
}
