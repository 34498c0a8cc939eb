//! Platform passthrough (spec §4.3, `0x0500`–`0x06FF`): codes this machine
//! does not interpret itself, forwarded verbatim to the host.

use crate::host::HostApi;
use crate::state::MachineState;

pub fn dispatch<H: HostApi>(
    host: &H,
    raw_function_code: u16,
    state: &mut MachineState,
) -> Result<(), H::Error> {
    host.platform_specific_post_check_execute(raw_function_code, state)
}
