//! Control-direction helpers on [`Connection`].
//!
//! Each command helper builds the ASDU for one standard command with cause
//! `Activation` and waits for the peer's confirmation through
//! [`Connection::send_and_confirm`]. The confirmation is returned so callers
//! can inspect its negative flag.
//!
//! File transfer helpers only queue their ASDU; the peer answers with further
//! file transfer ASDUs through the listener.
//!
//! Every ASDU built here carries the originator address from the connection
//! settings.

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::Result;
use crate::types::{
    Asdu, Cot, Cp16Time2a, Cp56Time2a, DoublePointState, FileStatusFlags, InformationElement,
    StepCommandState, TypeId,
};

/// Qualifier of interrogation for a station (global) interrogation.
pub const QOI_STATION: u8 = 20;

/// Qualifier of counter interrogation request for all counter groups.
pub const QCC_GENERAL_REQUEST: u8 = 5;

/// Qualifier of reset process for a general reset.
pub const QRP_GENERAL_RESET: u8 = 1;

/// Command state and optional time tag shared by the switching commands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommandOptions {
    /// Select (`true`) or execute (`false`)
    pub select: bool,
    /// Qualifier of command, 0..=31
    pub qualifier: u8,
    /// Time tag; selects the CP56Time2a variant of the type
    pub time: Option<Cp56Time2a>,
}

impl CommandOptions {
    pub fn execute() -> Self {
        Self::default()
    }

    pub fn select() -> Self {
        Self {
            select: true,
            ..Self::default()
        }
    }

    pub fn qualifier(mut self, qualifier: u8) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn time(mut self, time: Cp56Time2a) -> Self {
        self.time = Some(time);
        self
    }

    fn pick(&self, plain: TypeId, timed: TypeId) -> TypeId {
        if self.time.is_some() {
            timed
        } else {
            plain
        }
    }

    fn with_time(&self, mut elements: Vec<InformationElement>) -> Vec<InformationElement> {
        if let Some(time) = self.time {
            elements.push(InformationElement::Time56(time));
        }
        elements
    }
}

/// One entry of a file directory (F_DR_TA_1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectoryEntry {
    /// Name of file
    pub file: u16,
    /// Length of file, 24 bits
    pub length: u32,
    /// Status code, 0..=31
    pub status: u8,
    pub flags: FileStatusFlags,
    /// Creation time of the file
    pub created: Cp56Time2a,
}

impl DirectoryEntry {
    fn elements(&self) -> Vec<InformationElement> {
        vec![
            InformationElement::FileName(self.file),
            InformationElement::FileLength(self.length),
            InformationElement::FileStatus {
                status: self.status,
                flags: self.flags,
            },
            InformationElement::Time56(self.created),
        ]
    }
}

fn command(
    type_id: TypeId,
    cot: Cot,
    originator: u8,
    common_address: u16,
    address: u32,
    elements: Vec<InformationElement>,
) -> Asdu {
    let mut asdu = Asdu::single(type_id, cot, common_address, address, elements);
    asdu.originator = originator;
    asdu
}

impl Connection {
    fn activation(
        &self,
        type_id: TypeId,
        common_address: u16,
        address: u32,
        elements: Vec<InformationElement>,
    ) -> Asdu {
        self.command(type_id, Cot::Activation, common_address, address, elements)
    }

    fn command(
        &self,
        type_id: TypeId,
        cot: Cot,
        common_address: u16,
        address: u32,
        elements: Vec<InformationElement>,
    ) -> Asdu {
        command(
            type_id,
            cot,
            self.settings().originator_address,
            common_address,
            address,
            elements,
        )
    }

    /// Interrogation command (C_IC_NA_1). `qoi` is 20 for the station, 21..=36 for groups.
    pub async fn interrogation(&self, common_address: u16, qoi: u8) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::InterrogationCommand,
            common_address,
            0,
            vec![InformationElement::InterrogationQualifier(qoi)],
        ))
        .await
    }

    /// Counter interrogation command (C_CI_NA_1).
    ///
    /// `cot` is normally `Activation`; `Deactivation` cancels a running request.
    pub async fn counter_interrogation(
        &self,
        common_address: u16,
        cot: Cot,
        request: u8,
        freeze: u8,
    ) -> Result<Asdu> {
        self.send_and_confirm(&self.command(
            TypeId::CounterInterrogation,
            cot,
            common_address,
            0,
            vec![InformationElement::CounterQualifier { request, freeze }],
        ))
        .await
    }

    /// Read command (C_RD_NA_1). The answer arrives as monitoring data with
    /// cause `Request` through the listener.
    pub async fn read(&self, common_address: u16, address: u32) -> Result<()> {
        self.send(&self.command(
            TypeId::ReadCommand,
            Cot::Request,
            common_address,
            address,
            Vec::new(),
        ))
        .await
    }

    /// Clock synchronization command (C_CS_NA_1).
    pub async fn clock_sync(&self, common_address: u16, time: Cp56Time2a) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::ClockSync,
            common_address,
            0,
            vec![InformationElement::Time56(time)],
        ))
        .await
    }

    /// Test command (C_TS_NA_1) with the fixed test pattern.
    pub async fn test_command(&self, common_address: u16) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::TestCommand,
            common_address,
            0,
            vec![InformationElement::FixedTestPattern],
        ))
        .await
    }

    /// Test command with time tag (C_TS_TA_1).
    pub async fn test_command_with_time(
        &self,
        common_address: u16,
        counter: u16,
        time: Cp56Time2a,
    ) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::TestCommandTime56,
            common_address,
            0,
            vec![
                InformationElement::TestSequenceCounter(counter),
                InformationElement::Time56(time),
            ],
        ))
        .await
    }

    /// Reset process command (C_RP_NA_1).
    pub async fn reset_process(&self, common_address: u16, qrp: u8) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::ResetProcess,
            common_address,
            0,
            vec![InformationElement::ResetQualifier(qrp)],
        ))
        .await
    }

    /// Delay acquisition command (C_CD_NA_1).
    pub async fn delay_acquisition(&self, common_address: u16, delay: Cp16Time2a) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::DelayAcquisition,
            common_address,
            0,
            vec![InformationElement::Time16(delay)],
        ))
        .await
    }

    /// Single command (C_SC_NA_1 / C_SC_TA_1).
    pub async fn single_command(
        &self,
        common_address: u16,
        address: u32,
        on: bool,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![InformationElement::SingleCommand {
            on,
            qualifier: options.qualifier,
            select: options.select,
        }]);
        let type_id = options.pick(TypeId::SingleCommand, TypeId::SingleCommandTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Double command (C_DC_NA_1 / C_DC_TA_1).
    pub async fn double_command(
        &self,
        common_address: u16,
        address: u32,
        state: DoublePointState,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![InformationElement::DoubleCommand {
            state,
            qualifier: options.qualifier,
            select: options.select,
        }]);
        let type_id = options.pick(TypeId::DoubleCommand, TypeId::DoubleCommandTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Regulating step command (C_RC_NA_1 / C_RC_TA_1).
    pub async fn regulating_step_command(
        &self,
        common_address: u16,
        address: u32,
        state: StepCommandState,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![InformationElement::RegulatingStep {
            state,
            qualifier: options.qualifier,
            select: options.select,
        }]);
        let type_id = options.pick(TypeId::RegulatingStep, TypeId::RegulatingStepTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Set-point command, normalized value (C_SE_NA_1 / C_SE_TA_1).
    pub async fn setpoint_normalized(
        &self,
        common_address: u16,
        address: u32,
        value: i16,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![
            InformationElement::Normalized(value),
            setpoint_qualifier(&options),
        ]);
        let type_id = options.pick(TypeId::SetpointNormalized, TypeId::SetpointNormalizedTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Set-point command, scaled value (C_SE_NB_1 / C_SE_TB_1).
    pub async fn setpoint_scaled(
        &self,
        common_address: u16,
        address: u32,
        value: i16,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![
            InformationElement::Scaled(value),
            setpoint_qualifier(&options),
        ]);
        let type_id = options.pick(TypeId::SetpointScaled, TypeId::SetpointScaledTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Set-point command, short float (C_SE_NC_1 / C_SE_TC_1).
    pub async fn setpoint_float(
        &self,
        common_address: u16,
        address: u32,
        value: f32,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![
            InformationElement::ShortFloat(value),
            setpoint_qualifier(&options),
        ]);
        let type_id = options.pick(TypeId::SetpointFloat, TypeId::SetpointFloatTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Bitstring of 32 bit command (C_BO_NA_1 / C_BO_TA_1).
    ///
    /// Only the time tag of `options` applies.
    pub async fn bitstring_command(
        &self,
        common_address: u16,
        address: u32,
        value: u32,
        options: CommandOptions,
    ) -> Result<Asdu> {
        let elements = options.with_time(vec![InformationElement::Bitstring(value)]);
        let type_id = options.pick(TypeId::Bitstring32Command, TypeId::Bitstring32CommandTime56);
        self.send_and_confirm(&self.activation(type_id, common_address, address, elements))
            .await
    }

    /// Parameter of measured values, normalized (P_ME_NA_1).
    pub async fn parameter_normalized(
        &self,
        common_address: u16,
        address: u32,
        value: i16,
        kind: u8,
    ) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::ParameterNormalized,
            common_address,
            address,
            vec![InformationElement::Normalized(value), parameter_qualifier(kind)],
        ))
        .await
    }

    /// Parameter of measured values, scaled (P_ME_NB_1).
    pub async fn parameter_scaled(
        &self,
        common_address: u16,
        address: u32,
        value: i16,
        kind: u8,
    ) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::ParameterScaled,
            common_address,
            address,
            vec![InformationElement::Scaled(value), parameter_qualifier(kind)],
        ))
        .await
    }

    /// Parameter of measured values, short float (P_ME_NC_1).
    pub async fn parameter_float(
        &self,
        common_address: u16,
        address: u32,
        value: f32,
        kind: u8,
    ) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::ParameterFloat,
            common_address,
            address,
            vec![InformationElement::ShortFloat(value), parameter_qualifier(kind)],
        ))
        .await
    }

    /// Parameter activation (P_AC_NA_1).
    pub async fn parameter_activation(
        &self,
        common_address: u16,
        address: u32,
        qpa: u8,
    ) -> Result<Asdu> {
        self.send_and_confirm(&self.activation(
            TypeId::ParameterActivation,
            common_address,
            address,
            vec![InformationElement::ParameterActivationQualifier(qpa)],
        ))
        .await
    }

    /// Answer a received activation with its (possibly negative) confirmation.
    pub async fn send_confirmation(&self, asdu: &Asdu, negative: bool) -> Result<()> {
        self.send(&asdu.confirmation(negative)).await
    }

    /// File ready (F_FR_NA_1). `negative` marks the file as not ready.
    pub async fn file_ready(
        &self,
        common_address: u16,
        address: u32,
        file: u16,
        length: u32,
        qualifier: u8,
        negative: bool,
    ) -> Result<()> {
        self.send(&self.file_transfer(
            TypeId::FileReady,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::FileLength(length),
                InformationElement::FileReady {
                    qualifier,
                    negative,
                },
            ],
        ))
        .await
    }

    /// Section ready (F_SR_NA_1).
    #[allow(clippy::too_many_arguments)]
    pub async fn section_ready(
        &self,
        common_address: u16,
        address: u32,
        file: u16,
        section: u8,
        length: u32,
        qualifier: u8,
        not_ready: bool,
    ) -> Result<()> {
        self.send(&self.file_transfer(
            TypeId::SectionReady,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::SectionName(section),
                InformationElement::FileLength(length),
                InformationElement::SectionReady {
                    qualifier,
                    not_ready,
                },
            ],
        ))
        .await
    }

    /// Call directory, select file, call file or call section (F_SC_NA_1).
    ///
    /// A directory call uses `Request`, the others `FileTransfer`.
    pub async fn call_or_select_files(
        &self,
        common_address: u16,
        cot: Cot,
        address: u32,
        file: u16,
        section: u8,
        scq: u8,
    ) -> Result<()> {
        self.send(&self.command(
            TypeId::CallDirectory,
            cot,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::SectionName(section),
                InformationElement::SelectCall(scq),
            ],
        ))
        .await
    }

    /// Last section or last segment (F_LS_NA_1).
    pub async fn last_section_or_segment(
        &self,
        common_address: u16,
        address: u32,
        file: u16,
        section: u8,
        lsq: u8,
        checksum: u8,
    ) -> Result<()> {
        self.send(&self.file_transfer(
            TypeId::LastSection,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::SectionName(section),
                InformationElement::LastSection(lsq),
                InformationElement::Checksum(checksum),
            ],
        ))
        .await
    }

    /// Acknowledge file or section (F_AF_NA_1).
    pub async fn ack_file_or_section(
        &self,
        common_address: u16,
        address: u32,
        file: u16,
        section: u8,
        action: u8,
        notice: u8,
    ) -> Result<()> {
        self.send(&self.file_transfer(
            TypeId::AckFile,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::SectionName(section),
                InformationElement::AckFile { action, notice },
            ],
        ))
        .await
    }

    /// File segment (F_SG_NA_1). `data` must fit the ASDU.
    pub async fn send_segment(
        &self,
        common_address: u16,
        address: u32,
        file: u16,
        section: u8,
        data: Bytes,
    ) -> Result<()> {
        self.send(&self.file_transfer(
            TypeId::Segment,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::SectionName(section),
                InformationElement::Segment(data),
            ],
        ))
        .await
    }

    /// Directory (F_DR_TA_1), entries at consecutive addresses from `address`.
    pub async fn send_directory(
        &self,
        common_address: u16,
        address: u32,
        entries: &[DirectoryEntry],
    ) -> Result<()> {
        self.send(&directory(
            self.settings().originator_address,
            common_address,
            address,
            entries,
        ))
        .await
    }

    /// Query log, request archive file (F_SC_NB_1).
    pub async fn query_log(
        &self,
        common_address: u16,
        address: u32,
        file: u16,
        start: Cp56Time2a,
        end: Cp56Time2a,
    ) -> Result<()> {
        self.send(&self.file_transfer(
            TypeId::QueryLog,
            common_address,
            address,
            vec![
                InformationElement::FileName(file),
                InformationElement::Time56(start),
                InformationElement::Time56(end),
            ],
        ))
        .await
    }

    fn file_transfer(
        &self,
        type_id: TypeId,
        common_address: u16,
        address: u32,
        elements: Vec<InformationElement>,
    ) -> Asdu {
        self.command(type_id, Cot::FileTransfer, common_address, address, elements)
    }
}

fn directory(originator: u8, common_address: u16, address: u32, entries: &[DirectoryEntry]) -> Asdu {
    let mut asdu = Asdu::sequence(
        TypeId::Directory,
        Cot::FileTransfer,
        common_address,
        address,
        entries.iter().map(DirectoryEntry::elements).collect(),
    );
    asdu.originator = originator;
    asdu
}

fn setpoint_qualifier(options: &CommandOptions) -> InformationElement {
    InformationElement::SetpointQualifier {
        qualifier: options.qualifier,
        select: options.select,
    }
}

fn parameter_qualifier(kind: u8) -> InformationElement {
    InformationElement::MeasuredParameterQualifier {
        kind,
        change: false,
        not_in_operation: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AsduCodec;

    #[test]
    fn test_command_options_select_type() {
        let time = Cp56Time2a {
            milliseconds: 0,
            minute: 0,
            hour: 0,
            day: 1,
            day_of_week: 0,
            month: 1,
            year: 20,
            invalid: false,
            summer_time: false,
        };
        let plain = CommandOptions::execute();
        let timed = CommandOptions::select().time(time);
        assert_eq!(
            plain.pick(TypeId::SingleCommand, TypeId::SingleCommandTime56),
            TypeId::SingleCommand
        );
        assert_eq!(
            timed.pick(TypeId::SingleCommand, TypeId::SingleCommandTime56),
            TypeId::SingleCommandTime56
        );
        assert_eq!(timed.with_time(Vec::new()).len(), 1);
    }

    #[test]
    fn test_setpoint_asdu_encodes() {
        let options = CommandOptions::select().qualifier(3);
        let asdu = command(
            TypeId::SetpointScaled,
            Cot::Activation,
            0,
            1,
            4001,
            vec![InformationElement::Scaled(-5), setpoint_qualifier(&options)],
        );
        let bytes = AsduCodec::default().encode(&asdu).unwrap();
        // IOA 4001 = 0x000FA1, SVA -5, QOS select + 3
        assert_eq!(&bytes[6..], &[0xA1, 0x0F, 0x00, 0xFB, 0xFF, 0x83]);
    }

    #[test]
    fn test_originator_stamped_in_cot_field() {
        let asdu = command(
            TypeId::CounterInterrogation,
            Cot::Deactivation,
            9,
            1,
            0,
            vec![InformationElement::CounterQualifier {
                request: QCC_GENERAL_REQUEST,
                freeze: 0,
            }],
        );
        let bytes = AsduCodec::default().encode(&asdu).unwrap();
        assert_eq!(&bytes[..4], &[0x65, 0x01, 0x08, 0x09]);
        assert_eq!(AsduCodec::default().decode(bytes).unwrap().originator, 9);
    }

    #[test]
    fn test_directory_uses_consecutive_addresses() {
        let created = Cp56Time2a {
            milliseconds: 1000,
            minute: 30,
            hour: 12,
            day: 15,
            day_of_week: 3,
            month: 6,
            year: 24,
            invalid: false,
            summer_time: false,
        };
        let entries = [
            DirectoryEntry {
                file: 1,
                length: 0x01_0000,
                status: 0,
                flags: FileStatusFlags::empty(),
                created,
            },
            DirectoryEntry {
                file: 2,
                length: 512,
                status: 1,
                flags: FileStatusFlags::LAST_FILE,
                created,
            },
        ];
        let asdu = directory(0, 1, 700, &entries);
        let bytes = AsduCodec::default().encode(&asdu).unwrap();
        // SQ=1 with two entries, one address, 13 octets per entry
        assert_eq!(bytes[1], 0x82);
        assert_eq!(bytes.len(), 6 + 3 + 2 * 13);

        let decoded = AsduCodec::default().decode(bytes).unwrap();
        assert_eq!(decoded.cot, Cot::FileTransfer);
        let addressed: Vec<u32> = decoded.objects()[0]
            .addressed_sets()
            .map(|(address, _)| address)
            .collect();
        assert_eq!(addressed, vec![700, 701]);
        assert_eq!(decoded.objects()[0].element_sets[1], entries[1].elements());
    }
}
