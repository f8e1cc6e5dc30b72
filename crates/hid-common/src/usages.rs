//! HID usage pages and usages.
//!
//! Only the subset the supported device catalog actually emits. Reference:
//! USB HID Usage Tables 1.12.

// Usage pages.
pub const PAGE_GENERIC_DESKTOP: u16 = 0x01;
pub const PAGE_SIMULATION_CONTROLS: u16 = 0x02;
pub const PAGE_GENERIC_DEVICE_CONTROLS: u16 = 0x06;
pub const PAGE_KEYBOARD_KEYPAD: u16 = 0x07;
pub const PAGE_BUTTON: u16 = 0x09;
pub const PAGE_CONSUMER: u16 = 0x0c;

// Generic Desktop page.
pub const USAGE_AXIS_X: u16 = 0x30;
pub const USAGE_AXIS_Y: u16 = 0x31;
pub const USAGE_AXIS_Z: u16 = 0x32;
pub const USAGE_AXIS_RX: u16 = 0x33;
pub const USAGE_AXIS_RY: u16 = 0x34;
pub const USAGE_AXIS_RZ: u16 = 0x35;
pub const USAGE_WHEEL: u16 = 0x38;
pub const USAGE_HAT: u16 = 0x39;
pub const USAGE_SYSTEM_MAIN_MENU: u16 = 0x85;
pub const USAGE_DPAD_UP: u16 = 0x90;
pub const USAGE_DPAD_DOWN: u16 = 0x91;
pub const USAGE_DPAD_RIGHT: u16 = 0x92;
pub const USAGE_DPAD_LEFT: u16 = 0x93;

// Simulation Controls page.
pub const USAGE_ACCELERATOR: u16 = 0xc4;
pub const USAGE_BRAKE: u16 = 0xc5;

// Generic Device Controls page.
pub const USAGE_BATTERY_STRENGTH: u16 = 0x20;

// Consumer page.
pub const USAGE_ASSIGN_SELECTION: u16 = 0x81;
pub const USAGE_ORDER_MOVIE: u16 = 0x85;
pub const USAGE_MEDIA_SELECT_SECURITY: u16 = 0x99;
pub const USAGE_RECORD: u16 = 0xb2;
pub const USAGE_FAST_FORWARD: u16 = 0xb3;
pub const USAGE_REWIND: u16 = 0xb4;
pub const USAGE_PLAY_PAUSE: u16 = 0xcd;
pub const USAGE_AC_SEARCH: u16 = 0x0221;
pub const USAGE_AC_HOME: u16 = 0x0223;
pub const USAGE_AC_BACK: u16 = 0x0224;

// Keyboard/Keypad page.
pub const KB_NONE: u16 = 0x00;
pub const KB_A: u16 = 0x04;
pub const KB_B: u16 = 0x05;
pub const KB_C: u16 = 0x06;
pub const KB_D: u16 = 0x07;
pub const KB_E: u16 = 0x08;
pub const KB_F: u16 = 0x09;
pub const KB_G: u16 = 0x0a;
pub const KB_H: u16 = 0x0b;
pub const KB_I: u16 = 0x0c;
pub const KB_J: u16 = 0x0d;
pub const KB_K: u16 = 0x0e;
pub const KB_L: u16 = 0x0f;
pub const KB_M: u16 = 0x10;
pub const KB_N: u16 = 0x11;
pub const KB_O: u16 = 0x12;
pub const KB_P: u16 = 0x13;
pub const KB_Q: u16 = 0x14;
pub const KB_R: u16 = 0x15;
pub const KB_S: u16 = 0x16;
pub const KB_T: u16 = 0x17;
pub const KB_U: u16 = 0x18;
pub const KB_V: u16 = 0x19;
pub const KB_W: u16 = 0x1a;
pub const KB_X: u16 = 0x1b;
pub const KB_Y: u16 = 0x1c;
pub const KB_Z: u16 = 0x1d;
pub const KB_ENTER: u16 = 0x28;
pub const KB_LEFT_CONTROL: u16 = 0xe0;
pub const KB_RIGHT_GUI: u16 = 0xe7;
