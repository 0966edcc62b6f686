pub type ApuData = super::Apu;

impl super::Apu {
    pub fn save_state(&self) -> ApuData {
        self.clone()
    }

    pub fn load_state(&mut self, data: ApuData) {
        // keep the host-dependent sample rate and filter setup of the
        // running instance
        let sample_rate = self.sample_rate;
        let filters_enabled = self.filters_enabled;
        let filters = self.filters.clone();
        *self = data;
        self.sample_rate = sample_rate;
        self.filters_enabled = filters_enabled;
        self.filters = filters;
    }
}
