//! DMA channel abstractions
//!
//! Models a SAMD51-class DMA controller at the boundary the display push
//! engine needs: a per-channel block [`TransferDescriptor`] the engine
//! writes directly, and a [`DmaChannel`] trait for channel setup and arming.
//!
//! The descriptor's control word is kept human-readable as [`BlockControl`]
//! with named fields and is packed into the hardware bit layout only at the
//! write boundary, so the flag logic is unit-testable without hardware.
//!
//! # Descriptor layout
//!
//! ```text
//! offset  field     meaning
//! 0x0     btctrl    block transfer control (packed BlockControl)
//! 0x2     btcnt     beat count: bytes remaining in this burst
//! 0x4     srcaddr   one past the END of the source buffer
//! 0x8     dstaddr   fixed peripheral data register
//! 0xC     descaddr  next descriptor link (null: no link)
//! ```
//!
//! The source address convention is the controller's: with source increment
//! enabled the engine fetches from `srcaddr - btcnt`, so software provides
//! the address just past the end of the buffer rather than its start.

use core::ptr;

/// Action taken by the channel when a block transfer completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockAction {
    /// Disable the channel, no interrupt from the descriptor itself
    #[default]
    NoAct = 0,
    /// Raise the block interrupt
    Interrupt = 1,
    /// Suspend the channel
    Suspend = 2,
    /// Suspend and raise the block interrupt
    Both = 3,
}

/// Which address the step size applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepSelect {
    /// Step size applies to the destination address
    #[default]
    Destination = 0,
    /// Step size applies to the source address
    Source = 1,
}

/// Address increment step size, as a power-of-two multiple of the beat size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepSize {
    /// Increment by one beat
    #[default]
    X1 = 0,
    /// Increment by two beats
    X2 = 1,
    /// Increment by four beats
    X4 = 2,
    /// Increment by eight beats
    X8 = 3,
}

/// Human-readable form of the descriptor's block transfer control word
///
/// Assembled into the packed `u16` representation only when written into a
/// [`TransferDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockControl {
    /// Descriptor is valid and may be fetched by the controller
    pub valid: bool,
    /// Action on block completion
    pub block_action: BlockAction,
    /// Increment the source address every beat
    pub src_increment: bool,
    /// Increment the destination address every beat
    pub dst_increment: bool,
    /// Which side the step size applies to
    pub step_select: StepSelect,
    /// Address increment step size
    pub step_size: StepSize,
}

impl BlockControl {
    /// Control word for a memory-to-peripheral burst: valid descriptor,
    /// incrementing source, fixed destination, single-beat steps.
    pub const fn memory_to_peripheral() -> Self {
        Self {
            valid: true,
            block_action: BlockAction::NoAct,
            src_increment: true,
            dst_increment: false,
            step_select: StepSelect::Source,
            step_size: StepSize::X1,
        }
    }

    /// Pack into the hardware bit layout
    pub fn pack(self) -> u16 {
        (self.valid as u16)
            | (self.block_action as u16) << 3
            | (self.src_increment as u16) << 10
            | (self.dst_increment as u16) << 11
            | (self.step_select as u16) << 12
            | (self.step_size as u16) << 13
    }

    /// Recover the named form from a packed control word
    ///
    /// Reserved bits (1..=2, 5..=9) are ignored.
    pub fn unpack(raw: u16) -> Self {
        Self {
            valid: raw & 1 != 0,
            block_action: match (raw >> 3) & 0b11 {
                0 => BlockAction::NoAct,
                1 => BlockAction::Interrupt,
                2 => BlockAction::Suspend,
                _ => BlockAction::Both,
            },
            src_increment: raw & (1 << 10) != 0,
            dst_increment: raw & (1 << 11) != 0,
            step_select: if raw & (1 << 12) != 0 {
                StepSelect::Source
            } else {
                StepSelect::Destination
            },
            step_size: match (raw >> 13) & 0b111 {
                0 => StepSize::X1,
                1 => StepSize::X2,
                2 => StepSize::X4,
                _ => StepSize::X8,
            },
        }
    }
}

/// One memory-mapped block transfer descriptor
///
/// Lives for the lifetime of the channel (on real hardware, a slot in the
/// controller's descriptor table in RAM). The static fields (`btctrl`,
/// `dstaddr`) are written once by [`initialize`]; the per-burst fields
/// (`srcaddr`, `btcnt`) are rewritten by [`set_burst`] before every arm.
/// Neither may be touched while a transfer is active.
///
/// [`initialize`]: TransferDescriptor::initialize
/// [`set_burst`]: TransferDescriptor::set_burst
#[repr(C)]
#[derive(Debug)]
pub struct TransferDescriptor {
    btctrl: u16,
    btcnt: u16,
    srcaddr: *const u8,
    dstaddr: *mut u8,
    descaddr: *const TransferDescriptor,
}

impl TransferDescriptor {
    /// An all-zero, invalid descriptor
    pub const fn empty() -> Self {
        Self {
            btctrl: 0,
            btcnt: 0,
            srcaddr: ptr::null(),
            dstaddr: ptr::null_mut(),
            descaddr: ptr::null(),
        }
    }

    /// Write the static fields: control flags and the fixed destination
    ///
    /// Called once at bus configuration time.
    pub fn initialize(&mut self, control: BlockControl, destination: *mut u8) {
        self.btctrl = control.pack();
        self.btcnt = 0;
        self.srcaddr = ptr::null();
        self.dstaddr = destination;
        self.descaddr = ptr::null();
    }

    /// Write the per-burst fields
    ///
    /// `source_end` is the address one past the end of the source buffer and
    /// `len` its length in bytes. Must only be called while the owning bus
    /// is idle.
    pub fn set_burst(&mut self, source_end: *const u8, len: u16) {
        self.srcaddr = source_end;
        self.btcnt = len;
    }

    /// The packed control word
    pub fn control(&self) -> BlockControl {
        BlockControl::unpack(self.btctrl)
    }

    /// Bytes remaining in the programmed burst
    pub fn burst_len(&self) -> u16 {
        self.btcnt
    }

    /// The programmed one-past-the-end source address
    pub fn source_end(&self) -> *const u8 {
        self.srcaddr
    }

    /// The fixed destination register address
    pub fn destination(&self) -> *mut u8 {
        self.dstaddr
    }
}

/// DMA trigger source identifier
///
/// Chip-specific peripheral trigger index, e.g. a SERCOM TX trigger. Opaque
/// to the engine; the integrator supplies the right constant for the serial
/// peripheral backing the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerSource(pub u32);

/// What one trigger event moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerAction {
    /// One burst per trigger
    #[default]
    Burst,
    /// One block per trigger
    Block,
    /// The whole transaction per trigger
    Transaction,
}

/// Beats moved per burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstLength {
    /// Single-beat bursts
    #[default]
    Single,
    /// Four-beat bursts
    Four,
    /// Eight-beat bursts
    Eight,
    /// Sixteen-beat bursts
    Sixteen,
}

/// One DMA channel, owned by the bus that transmits through it
///
/// Setup order during bus configuration matches the controller's
/// requirements: disable, software-reset, set priority, set trigger, enable
/// the completion interrupt; after that each transfer programs the
/// descriptor and calls [`enable`] to arm.
///
/// [`enable`]: DmaChannel::enable
pub trait DmaChannel {
    /// Clear the channel enable bit
    fn disable(&mut self);

    /// Software-reset the channel
    ///
    /// The channel must be disabled first.
    fn reset(&mut self);

    /// Set the channel arbitration priority level
    fn set_priority(&mut self, level: u8);

    /// Select the trigger source, trigger action and burst length
    fn set_trigger(&mut self, source: TriggerSource, action: TriggerAction, burst: BurstLength);

    /// Enable the channel's transfer-complete interrupt source
    fn enable_complete_interrupt(&mut self);

    /// The channel's block descriptor slot
    fn descriptor(&mut self) -> &mut TransferDescriptor;

    /// Set the channel enable bit, arming the programmed burst
    fn enable(&mut self);
}

/// Interrupt-context handle to a [`DmaChannel`]'s completion flag
///
/// Separate from [`DmaChannel`] so the transfer-complete handler can own
/// the acknowledge path while the bus keeps the transmit path.
pub trait DmaChannelIrq {
    /// Acknowledge the channel's transfer-complete flag
    ///
    /// Mandatory in the handler, otherwise the interrupt re-fires.
    fn acknowledge_complete(&mut self);
}
