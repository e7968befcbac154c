mod symphonia_transcoder_test;
