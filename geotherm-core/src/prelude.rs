//! Convenience re-exports of the types needed to build and run a simulation.

pub use crate::addons::{AddOns, Ccus, SDacGt};
pub use crate::cache::ResultCache;
pub use crate::economics::{EconomicModel, Economics, EconomicsKind};
pub use crate::input::{InputParameters, ParameterEntry};
pub use crate::model::{CalcStep, Model, RunStage, Selectors, UtilizationPass};
pub use crate::outputs::{Outputs, RunResult};
pub use crate::parameter::{
    read_parameter, OutputParameter, OutputParameterDict, OutputValue, Parameter, ParameterDict,
    ParameterValue, SubModel,
};
pub use crate::reservoir::{Reservoir, ReservoirKind};
pub use crate::surface_plant::{EndUseOption, PowerPlantType, SurfacePlant, SurfacePlantKind};
pub use crate::traits::{ApproxEq, SerdeAPI};
pub use crate::units::{convert, Unit, UnitError, UnitType};
pub use crate::wellbores::{WellBores, WellBoresKind};
