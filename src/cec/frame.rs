use super::enums::{CECError, CECLogicalAddress, CECOpcode};

/// A CEC frame carries at most one header block and 15 data blocks
pub const CEC_MAX_FRAME_SIZE: usize = 16;

/// A validated CEC frame: header block, then an optional opcode and its operands
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CECFrame {
    data: Vec<u8>,
}

impl CECFrame {
    pub fn new(
        initiator: u8,
        destination: u8,
        opcode: CECOpcode,
        operands: &[u8],
    ) -> Result<CECFrame, CECError> {
        if initiator > 0xF || destination > 0xF {
            return Err(CECError::InvalidArgument);
        }
        let mut data = Vec::with_capacity(2 + operands.len());
        data.push(initiator << 4 | destination);
        data.push(opcode as u8);
        data.extend_from_slice(operands);
        CECFrame::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<CECFrame, CECError> {
        if data.is_empty() || data.len() > CEC_MAX_FRAME_SIZE {
            Err(CECError::InvalidArgument)
        } else {
            Ok(CECFrame { data })
        }
    }

    pub fn initiator(&self) -> u8 {
        self.data[0] >> 4
    }

    pub fn destination(&self) -> u8 {
        self.data[0] & 0x0F
    }

    pub fn is_broadcast(&self) -> bool {
        self.destination() == CECLogicalAddress::Broadcast.raw()
    }

    pub fn opcode(&self) -> Option<u8> {
        self.data.get(1).copied()
    }

    pub fn has_opcode(&self, opcode: CECOpcode) -> bool {
        self.opcode() == Some(opcode as u8)
    }

    pub fn operands(&self) -> &[u8] {
        if self.data.len() > 2 {
            &self.data[2..]
        } else {
            &[]
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl std::convert::TryFrom<&[u8]> for CECFrame {
    type Error = CECError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        CECFrame::from_bytes(data.to_vec())
    }
}

impl std::fmt::Display for CECFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes: Vec<String> = self.data.iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "{}", bytes.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    #[test]
    fn it_decodes_the_header_block() {
        let frame = CECFrame::try_from(&[0x47u8, 0x9F][..]).unwrap();

        assert_eq!(0x4, frame.initiator());
        assert_eq!(0x7, frame.destination());
        assert!(frame.has_opcode(CECOpcode::GetCECVersion));
        assert!(frame.operands().is_empty());
        assert!(!frame.is_broadcast());
        assert_eq!("47:9F", frame.to_string());
    }

    #[test]
    fn it_builds_broadcast_frames() {
        let frame =
            CECFrame::new(0x0, 0xF, CECOpcode::ReportPhysicalAddress, &[0x00, 0x00]).unwrap();

        assert_eq!(&[0x0Fu8, 0x84, 0x00, 0x00][..], frame.as_bytes());
        assert!(frame.is_broadcast());
        assert_eq!(&[0x00u8, 0x00][..], frame.operands());
    }

    #[test]
    fn it_accepts_header_only_frames() {
        let frame = CECFrame::from_bytes(vec![0x40]).unwrap();

        assert_eq!(0x0, frame.destination());
        assert_eq!(None, frame.opcode());
        assert!(frame.operands().is_empty());
    }

    #[test]
    fn it_rejects_invalid_frames() {
        assert_eq!(Err(CECError::InvalidArgument), CECFrame::from_bytes(vec![]));
        assert_eq!(
            Err(CECError::InvalidArgument),
            CECFrame::from_bytes(vec![0x0F; CEC_MAX_FRAME_SIZE + 1])
        );
        assert!(CECFrame::from_bytes(vec![0x0F; CEC_MAX_FRAME_SIZE]).is_ok());
        assert_eq!(
            Err(CECError::InvalidArgument),
            CECFrame::new(0x10, 0x0, CECOpcode::ImageViewOn, &[])
        );
    }
}
