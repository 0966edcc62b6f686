use super::axrom::Axrom;
use super::bnrom::Bnrom;
use super::camerica::Camerica;
use super::cnrom::Cnrom;
use super::color_dreams::ColorDreams;
use super::cprom::Cprom;
use super::gxrom::Gxrom;
use super::jaleco::Jaleco;
use super::mmc1::Mmc1;
use super::mmc2::Mmc2;
use super::mmc3::Mmc3;
use super::nina::Nina;
use super::nrom::Nrom;
use super::uxrom::Uxrom;
use super::vrc::Vrc;
use super::UnknownMapper;

// Each mapper snapshots as a clone of itself; the enum tag records which
// board the snapshot belongs to so a load into the wrong mapper is a no-op.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub enum MapperData {
    Nrom(Nrom),
    Mmc1(Mmc1),
    Uxrom(Uxrom),
    Cnrom(Cnrom),
    Mmc3(Mmc3),
    Axrom(Axrom),
    Mmc2(Mmc2),
    Vrc(Vrc),
    ColorDreams(ColorDreams),
    Cprom(Cprom),
    Gxrom(Gxrom),
    Bnrom(Bnrom),
    Camerica(Camerica),
    Nina(Nina),
    Jaleco(Jaleco),
    Unknown(UnknownMapper),
}
